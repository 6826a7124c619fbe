//! Value model produced by the interpreter
//!
//! A [`Record`] owns its [`Field`]s, each field owns its [`Value`], and
//! record-valued variants own their nested records. Trees are built once per
//! line and never mutated afterwards.

/// A named, braced structure: `Identifier{field=value, ...}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Class name preceding the opening brace
    pub identifier: String,
    /// Fields in source order; may be empty
    pub fields: Vec<Field>,
}

/// One `name=value` entry of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub identifier: String,
    pub value: Value,
}

/// Contents of a field. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// URL literal, raw text
    Url(String),
    /// Nested record
    Record(Record),
    /// Free-form text, verbatim
    Text(String),
    /// `{}`
    EmptyObject,
    /// `[]`
    EmptyArray,
    /// Non-empty `[A{..}, B{..}]`
    RecordList(Vec<Record>),
    /// `name=` with nothing after the equals sign
    Nothing,
}

/// How a downstream renderer should present a [`Value::Text`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Number,
    Boolean,
    Plain,
}

impl TextKind {
    pub fn classify(text: &str) -> Self {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            TextKind::Number
        } else if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
            TextKind::Boolean
        } else {
            TextKind::Plain
        }
    }
}

impl Value {
    pub fn is_url(&self) -> bool {
        matches!(self, Value::Url(_))
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Value::Nothing)
    }

    /// `{}`, `[]` and a missing value carry no payload
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::EmptyObject | Value::EmptyArray | Value::Nothing)
    }

    pub fn as_url(&self) -> Option<&str> {
        match self {
            Value::Url(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Records of a list. An empty array yields an empty slice.
    pub fn as_records(&self) -> Option<&[Record]> {
        match self {
            Value::RecordList(list) => Some(list),
            Value::EmptyArray => Some(&[][..]),
            _ => None,
        }
    }

    /// Renderer hint for text values
    pub fn text_kind(&self) -> Option<TextKind> {
        self.as_text().map(TextKind::classify)
    }

    /// Field of a nested record
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_record().and_then(|r| r.get(name))
    }
}

impl Record {
    /// Create a record with no fields
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, identifier: impl Into<String>, value: Value) -> Self {
        self.fields.push(Field::new(identifier, value));
        self
    }

    pub fn with_text(self, identifier: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_field(identifier, Value::Text(text.into()))
    }

    pub fn with_url(self, identifier: impl Into<String>, url: impl Into<String>) -> Self {
        self.with_field(identifier, Value::Url(url.into()))
    }

    pub fn with_record(self, identifier: impl Into<String>, record: Record) -> Self {
        self.with_field(identifier, Value::Record(record))
    }

    /// First field with this exact name. Record-literal names are case-sensitive.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.identifier == name)
            .map(|f| &f.value)
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.identifier.as_str()).collect()
    }

    /// Deepest chain of nested records below and including this one
    pub fn depth(&self) -> usize {
        1 + self
            .fields
            .iter()
            .map(|f| match &f.value {
                Value::Record(r) => r.depth(),
                Value::RecordList(list) => list.iter().map(Record::depth).max().unwrap_or(0),
                _ => 0,
            })
            .max()
            .unwrap_or(0)
    }
}

impl Field {
    pub fn new(identifier: impl Into<String>, value: Value) -> Self {
        Self {
            identifier: identifier.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        let url = Value::Url("https://example.com".to_string());
        assert!(url.is_url());
        assert_eq!(url.as_url(), Some("https://example.com"));
        assert_eq!(url.as_text(), None);

        let text = Value::Text("hello".to_string());
        assert!(text.is_text());
        assert_eq!(text.as_text(), Some("hello"));

        assert!(Value::Nothing.is_nothing());
        assert!(Value::EmptyObject.is_empty());
        assert_eq!(Value::EmptyArray.as_records(), Some(&[][..]));

        let list = Value::RecordList(vec![Record::new("A"), Record::new("A")]);
        assert_eq!(list.as_records().unwrap().len(), 2);
    }

    #[test]
    fn test_record_builder() {
        let record = Record::new("User")
            .with_text("name", "bob")
            .with_url("self", "https://api/users/1")
            .with_record("team", Record::new("Team").with_text("id", "7"))
            .with_field("tags", Value::EmptyArray);

        assert_eq!(record.keys(), vec!["name", "self", "team", "tags"]);
        assert_eq!(record.get_text("name"), Some("bob"));
        assert_eq!(record.get("team").and_then(|t| t.get("id")), Some(&Value::Text("7".into())));
        assert!(record.has("tags"));
        assert!(!record.has("Name"));
        assert_eq!(record.depth(), 2);
    }

    #[test]
    fn test_text_kind() {
        assert_eq!(TextKind::classify("19982890"), TextKind::Number);
        assert_eq!(TextKind::classify("TRUE"), TextKind::Boolean);
        assert_eq!(TextKind::classify("false"), TextKind::Boolean);
        assert_eq!(TextKind::classify("5.00"), TextKind::Plain);
        assert_eq!(TextKind::classify(""), TextKind::Plain);
        assert_eq!(Value::Text("42".into()).text_kind(), Some(TextKind::Number));
        assert_eq!(Value::EmptyArray.text_kind(), None);
    }
}
