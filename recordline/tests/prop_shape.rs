//! Property tests over generated value-model trees
//!
//! 1. Serialized values always carry the three flags
//! 2. At most one payload key next to them
//! 3. Formatting then parsing reproduces the model
//! 4. Serializing then decoding reproduces the model

use proptest::prelude::*;
use recordline::serializer::{keys, record_from_generic};
use recordline::{convert, serialize_record, serialize_value, to_literal, Record, Value};
use serde_json::Value as JsonValue;

const FLAGS: [&str; 3] = [keys::EMPTY_OBJECT, keys::EMPTY_ARRAY, keys::NOTHING];
const PAYLOADS: [&str; 4] = [keys::URL, keys::CLASS, keys::STRING, keys::CLASSES];

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z][a-z0-9]{0,8}".prop_map(Value::Text),
        "[a-z]{1,6}".prop_map(|host| Value::Url(format!("https://{host}.example/p?q=1"))),
        Just(Value::EmptyObject),
        Just(Value::EmptyArray),
        Just(Value::Nothing),
    ]
}

fn record_with(value: impl Strategy<Value = Value>) -> impl Strategy<Value = Record> {
    (
        "[A-Z][a-zA-Z0-9]{0,8}",
        proptest::collection::vec(("[a-z][a-zA-Z0-9]{0,6}", value), 0..4),
    )
        .prop_map(|(identifier, fields)| {
            fields
                .into_iter()
                .fold(Record::new(identifier), |r, (name, v)| r.with_field(name, v))
        })
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            record_with(inner.clone()).prop_map(Value::Record),
            proptest::collection::vec(record_with(inner), 1..3).prop_map(Value::RecordList),
        ]
    })
}

fn record() -> impl Strategy<Value = Record> {
    record_with(value())
}

fn check_value_shape(value: &JsonValue) -> Result<(), TestCaseError> {
    let map = value.as_object().expect("value map");
    for flag in FLAGS {
        prop_assert!(map.get(flag).map(JsonValue::is_boolean).unwrap_or(false), "missing {}", flag);
    }
    let payloads = PAYLOADS.iter().filter(|k| map.contains_key(**k)).count();
    prop_assert!(payloads <= 1, "{} payload keys in {}", payloads, value);
    Ok(())
}

fn check_record_shape(record: &JsonValue) -> Result<(), TestCaseError> {
    for var in record["Vars"].as_array().expect("vars") {
        let value = &var["Value"];
        check_value_shape(value)?;
        if let Some(class) = value.get(keys::CLASS) {
            check_record_shape(class)?;
        }
        if let Some(classes) = value.get(keys::CLASSES).and_then(JsonValue::as_array) {
            for class in classes {
                check_record_shape(class)?;
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_flags_always_present(v in value()) {
        check_value_shape(&JsonValue::Object(serialize_value(&v)))?;
    }

    #[test]
    fn prop_nested_values_keep_shape(r in record()) {
        check_record_shape(&JsonValue::Object(serialize_record(&r)))?;
    }

    #[test]
    fn prop_literal_round_trip(r in record()) {
        let text = to_literal(&r);
        let parsed = convert(&text);
        prop_assert_eq!(parsed.as_ref().ok(), Some(&r), "failed on {}", text);
    }

    #[test]
    fn prop_generic_round_trip(r in record()) {
        let generic = JsonValue::Object(serialize_record(&r));
        prop_assert_eq!(record_from_generic(&generic).ok(), Some(r));
    }

    #[test]
    fn prop_serialize_deterministic(r in record()) {
        let text = to_literal(&r);
        let a = convert(&text).map(|r| serde_json::to_string(&r).unwrap_or_default());
        let b = convert(&text).map(|r| serde_json::to_string(&r).unwrap_or_default());
        prop_assert_eq!(a, b);
    }
}
