//! Generic serializer for the value model
//!
//! Produces the map shape existing consumers read: every value carries the
//! three boolean flags, and at most one payload key next to them. The
//! reverse direction ([`record_from_generic`]) is what a consumer does to
//! rebuild the tagged union from that map.

use crate::error::DecodeError;
use crate::value::{Field, Record, Value};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Ordered string-keyed map of generic values
pub type GenericMap = serde_json::Map<String, JsonValue>;

/// Wire keys
pub mod keys {
    pub const IDENTIFIER: &str = "Identifier";
    pub const VARS: &str = "Vars";
    pub const VALUE: &str = "Value";

    pub const EMPTY_OBJECT: &str = "EmptyObject";
    pub const EMPTY_ARRAY: &str = "EmptyArray";
    pub const NOTHING: &str = "Nothing";

    pub const URL: &str = "Url";
    pub const URL_CONTENT: &str = "Content";
    pub const CLASS: &str = "Class";
    pub const STRING: &str = "String";
    pub const CLASSES: &str = "Classes";
}

/// `{"Identifier": .., "Vars": [..]}`
pub fn serialize_record(record: &Record) -> GenericMap {
    let mut map = GenericMap::new();
    map.insert(keys::IDENTIFIER.into(), JsonValue::String(record.identifier.clone()));
    map.insert(
        keys::VARS.into(),
        JsonValue::Array(
            record
                .fields
                .iter()
                .map(|f| JsonValue::Object(serialize_field(f)))
                .collect(),
        ),
    );
    map
}

/// `{"Identifier": .., "Value": {..}}`
pub fn serialize_field(field: &Field) -> GenericMap {
    let mut map = GenericMap::new();
    map.insert(keys::IDENTIFIER.into(), JsonValue::String(field.identifier.clone()));
    map.insert(keys::VALUE.into(), JsonValue::Object(serialize_value(&field.value)));
    map
}

/// Flags first, then the payload key of the active variant, if it has one
pub fn serialize_value(value: &Value) -> GenericMap {
    let mut map = GenericMap::new();
    map.insert(keys::EMPTY_OBJECT.into(), JsonValue::Bool(matches!(value, Value::EmptyObject)));
    map.insert(keys::EMPTY_ARRAY.into(), JsonValue::Bool(matches!(value, Value::EmptyArray)));
    map.insert(keys::NOTHING.into(), JsonValue::Bool(matches!(value, Value::Nothing)));

    match value {
        Value::Url(content) => {
            let mut url = GenericMap::new();
            url.insert(keys::URL_CONTENT.into(), JsonValue::String(content.clone()));
            map.insert(keys::URL.into(), JsonValue::Object(url));
        }
        Value::Record(record) => {
            map.insert(keys::CLASS.into(), JsonValue::Object(serialize_record(record)));
        }
        Value::Text(text) => {
            map.insert(keys::STRING.into(), JsonValue::String(text.clone()));
        }
        Value::RecordList(records) if !records.is_empty() => {
            map.insert(
                keys::CLASSES.into(),
                JsonValue::Array(
                    records
                        .iter()
                        .map(|r| JsonValue::Object(serialize_record(r)))
                        .collect(),
                ),
            );
        }
        Value::RecordList(_) | Value::EmptyObject | Value::EmptyArray | Value::Nothing => {}
    }

    map
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_record(self).serialize(serializer)
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_field(self).serialize(serializer)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_value(self).serialize(serializer)
    }
}

fn object<'a>(value: &'a JsonValue, context: &'static str) -> Result<&'a GenericMap, DecodeError> {
    value.as_object().ok_or(DecodeError::NotAnObject(context))
}

fn required<'a>(
    map: &'a GenericMap,
    key: &'static str,
    context: &'static str,
) -> Result<&'a JsonValue, DecodeError> {
    map.get(key).ok_or(DecodeError::MissingKey { key, context })
}

fn string_key(map: &GenericMap, key: &'static str, context: &'static str) -> Result<String, DecodeError> {
    required(map, key, context)?
        .as_str()
        .map(str::to_string)
        .ok_or(DecodeError::WrongType { key, context, expected: "a string" })
}

fn bool_key(map: &GenericMap, key: &'static str) -> Result<bool, DecodeError> {
    required(map, key, "value")?
        .as_bool()
        .ok_or(DecodeError::WrongType { key, context: "value", expected: "a boolean" })
}

fn list_key<'a>(
    map: &'a GenericMap,
    key: &'static str,
    context: &'static str,
) -> Result<&'a [JsonValue], DecodeError> {
    required(map, key, context)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or(DecodeError::WrongType { key, context, expected: "a list" })
}

/// Rebuild a record from its generic map
pub fn record_from_generic(value: &JsonValue) -> Result<Record, DecodeError> {
    let map = object(value, "record")?;
    let identifier = string_key(map, keys::IDENTIFIER, "record")?;
    let fields = list_key(map, keys::VARS, "record")?
        .iter()
        .map(field_from_generic)
        .collect::<Result<_, _>>()?;
    Ok(Record { identifier, fields })
}

pub fn field_from_generic(value: &JsonValue) -> Result<Field, DecodeError> {
    let map = object(value, "field")?;
    let identifier = string_key(map, keys::IDENTIFIER, "field")?;
    let value = value_from_generic(required(map, keys::VALUE, "field")?)?;
    Ok(Field { identifier, value })
}

/// Exactly one flag or payload key must select the variant
pub fn value_from_generic(value: &JsonValue) -> Result<Value, DecodeError> {
    let map = object(value, "value")?;
    let mut found: Vec<(&'static str, Value)> = Vec::new();

    if bool_key(map, keys::EMPTY_OBJECT)? {
        found.push((keys::EMPTY_OBJECT, Value::EmptyObject));
    }
    if bool_key(map, keys::EMPTY_ARRAY)? {
        found.push((keys::EMPTY_ARRAY, Value::EmptyArray));
    }
    if bool_key(map, keys::NOTHING)? {
        found.push((keys::NOTHING, Value::Nothing));
    }
    if let Some(url) = map.get(keys::URL) {
        let content = string_key(object(url, "url")?, keys::URL_CONTENT, "url")?;
        found.push((keys::URL, Value::Url(content)));
    }
    if let Some(class) = map.get(keys::CLASS) {
        found.push((keys::CLASS, Value::Record(record_from_generic(class)?)));
    }
    if map.contains_key(keys::STRING) {
        found.push((keys::STRING, Value::Text(string_key(map, keys::STRING, "value")?)));
    }
    if map.contains_key(keys::CLASSES) {
        let records = list_key(map, keys::CLASSES, "value")?
            .iter()
            .map(record_from_generic)
            .collect::<Result<Vec<_>, _>>()?;
        let value = if records.is_empty() { Value::EmptyArray } else { Value::RecordList(records) };
        found.push((keys::CLASSES, value));
    }

    match found.len() {
        0 => Err(DecodeError::NoVariant),
        1 => Ok(found.remove(0).1),
        _ => Err(DecodeError::Ambiguous(
            found.iter().map(|(k, _)| *k).collect::<Vec<_>>().join(", "),
        )),
    }
}
