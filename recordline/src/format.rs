//! Formatter for record literals
//!
//! Converts the value model back to `Name{field=value, ...}` text, either
//! on one line or indented one field per line.

use crate::value::{Record, Value};
use std::fmt;

/// Options for formatting
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    /// Indentation unit; `None` keeps everything on one line
    pub indent: Option<String>,
}

impl FormatOptions {
    pub fn compact() -> Self {
        Self::default()
    }

    /// One field per line, indented by `width` spaces per level
    pub fn indented(width: usize) -> Self {
        Self {
            indent: Some(" ".repeat(width)),
        }
    }
}

/// Format a record on a single line
pub fn to_literal(record: &Record) -> String {
    format_record(record, &FormatOptions::compact())
}

/// Format a record with custom options
pub fn format_record(record: &Record, options: &FormatOptions) -> String {
    let mut output = String::new();
    write_record(&mut output, record, options, 0);
    output
}

fn newline(output: &mut String, options: &FormatOptions, depth: usize) {
    if let Some(indent) = &options.indent {
        output.push('\n');
        output.push_str(&indent.repeat(depth));
    }
}

fn separator(output: &mut String, options: &FormatOptions) {
    output.push(',');
    if options.indent.is_none() {
        output.push(' ');
    }
}

fn write_record(output: &mut String, record: &Record, options: &FormatOptions, depth: usize) {
    output.push_str(&record.identifier);
    output.push('{');
    if record.fields.is_empty() {
        output.push('}');
        return;
    }

    for (i, field) in record.fields.iter().enumerate() {
        if i > 0 {
            separator(output, options);
        }
        newline(output, options, depth + 1);
        output.push_str(&field.identifier);
        output.push('=');
        write_value(output, &field.value, options, depth + 1);
    }

    newline(output, options, depth);
    output.push('}');
}

fn write_value(output: &mut String, value: &Value, options: &FormatOptions, depth: usize) {
    match value {
        Value::Url(url) => output.push_str(url),
        Value::Text(text) => output.push_str(text),
        Value::Record(record) => write_record(output, record, options, depth),
        Value::EmptyObject => output.push_str("{}"),
        Value::EmptyArray => output.push_str("[]"),
        Value::Nothing => {}
        Value::RecordList(records) => {
            output.push('[');
            for (i, record) in records.iter().enumerate() {
                if i > 0 {
                    separator(output, options);
                }
                newline(output, options, depth + 1);
                write_record(output, record, options, depth + 1);
            }
            if !records.is_empty() {
                newline(output, options, depth);
            }
            output.push(']');
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&to_literal(self))
    }
}
