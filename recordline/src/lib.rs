//! Record-literal log line interpreter
//!
//! Many server runtimes log objects in the `toString` notation
//! `ClassName{field=value, other=[Item{..}, Item{..}], link=https://..}`.
//! This crate turns one such line into a typed [`Record`] and then into a
//! generic map that JSON consumers can render without knowing the model.
//!
//! Pipeline: text → [`Tokenizer`] → [`Parser`] (parse [`Node`] tree) →
//! [`Interpreter`] ([`Record`]) → [`serialize_record`] ([`GenericMap`]).
//!
//! # Example
//!
//! ```
//! use recordline::{convert, serialize_record, Value};
//!
//! let record = convert("User{name=bob, team=Team{id=7}, tags=[], nick=}").unwrap();
//! assert_eq!(record.identifier, "User");
//! assert_eq!(record.get_text("name"), Some("bob"));
//! assert_eq!(record.get("tags"), Some(&Value::EmptyArray));
//! assert_eq!(record.get("nick"), Some(&Value::Nothing));
//!
//! let map = serialize_record(&record);
//! assert_eq!(map["Identifier"], "User");
//! ```
//!
//! # Host boundary
//!
//! ```
//! use recordline::host::handle_call;
//! use serde_json::json;
//!
//! let ok = handle_call(&[json!("Event{self=https://api.example.com/e/1}")]);
//! assert!(!ok.contains_key("Error"));
//!
//! let failed = handle_call(&[json!(1)]);
//! assert_eq!(failed["Error"], "bad call, arg must be a string");
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod host;
pub mod interpreter;
pub mod parser;
pub mod position;
pub mod serializer;
pub mod token;
pub mod tokenizer;
pub mod tree;
pub mod value;

// Re-exports
pub use config::Options;
pub use error::{DecodeError, Error, InterpretError, ParseError};
pub use format::{format_record, to_literal, FormatOptions};
pub use host::{convert, convert_with};
pub use interpreter::{interpret, interpret_with, Interpreter};
pub use parser::{parse_tree, parse_tree_with, Parser, RecordParser, TreeProvider};
pub use position::{Position, Span};
pub use serializer::{
    record_from_generic, serialize_field, serialize_record, serialize_value, GenericMap,
};
pub use token::{Token, TokenKind};
pub use tokenizer::Tokenizer;
pub use tree::{Node, Rule, Terminal};
pub use value::{Field, Record, TextKind, Value};
