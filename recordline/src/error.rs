//! Error types for parsing, interpreting and decoding record literals

use crate::position::{Position, Span};
use thiserror::Error;

/// Syntax errors raised while building the parse tree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected token: expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("unexpected end of input at {pos}")]
    UnexpectedEof { pos: Position },

    #[error("empty input")]
    EmptyInput,

    #[error("nesting too deep (max {max}) at {span}")]
    NestingTooDeep { max: usize, span: Span },
}

impl ParseError {
    /// Get the span where this error occurred
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnexpectedToken { span, .. } => Some(*span),
            ParseError::UnexpectedEof { pos } => Some(Span::single(*pos)),
            ParseError::NestingTooDeep { span, .. } => Some(*span),
            ParseError::EmptyInput => None,
        }
    }

    fn headline(&self) -> String {
        match self {
            ParseError::UnexpectedToken { expected, found, .. } => {
                format!("Expected {}, found {}", expected, found)
            }
            ParseError::UnexpectedEof { .. } => "Unexpected end of input".to_string(),
            ParseError::EmptyInput => "Empty input".to_string(),
            ParseError::NestingTooDeep { max, .. } => format!("Nesting too deep (max {})", max),
        }
    }
}

/// Failures of the semantic interpreter.
///
/// Structural errors carry the exact message surfaced to callers, so
/// `Display` prints nothing but that message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpretError {
    /// The tree shape matches no interpreter rule
    #[error("{message}")]
    Structural { message: String, span: Option<Span> },

    /// Unexpected fault while interpreting (e.g. a contained panic)
    #[error("{message}")]
    Internal { message: String },
}

impl InterpretError {
    pub fn structural(message: impl Into<String>, span: Span) -> Self {
        InterpretError::Structural {
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        InterpretError::Internal { message: message.into() }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, InterpretError::Structural { .. })
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            InterpretError::Structural { span, .. } => *span,
            InterpretError::Internal { .. } => None,
        }
    }
}

/// Any failure of the text → record pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Interpret(#[from] InterpretError),
}

impl Error {
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Parse(e) => e.span(),
            Error::Interpret(e) => e.span(),
        }
    }

    /// Create a formatted error message with source context
    pub fn format_with_source(&self, source: &str) -> String {
        let message = match self {
            Error::Parse(e) => e.headline(),
            Error::Interpret(e) => e.to_string(),
        };
        match self.span() {
            Some(span) => format!(
                "Error at {}: {}\n{}",
                span,
                message,
                format_source_context(source, span)
            ),
            None => format!("Error: {}", message),
        }
    }
}

/// Failures decoding a generic map back into the value model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("missing key '{key}' in {context}")]
    MissingKey { key: &'static str, context: &'static str },

    #[error("key '{key}' in {context} must be {expected}")]
    WrongType {
        key: &'static str,
        context: &'static str,
        expected: &'static str,
    },

    #[error("value sets more than one variant: {0}")]
    Ambiguous(String),

    #[error("value sets no variant")]
    NoVariant,

    #[error("expected a JSON object for {0}")]
    NotAnObject(&'static str),
}

/// Render the offending line with a caret marker under the span
fn format_source_context(source: &str, span: Span) -> String {
    let lines: Vec<&str> = source.lines().collect();

    if span.start.line == 0 || span.start.line > lines.len() {
        return String::new();
    }

    let line_idx = span.start.line - 1;
    let line_num_width = span.start.line.to_string().len().max(3);

    let mut result = format!(
        "{:>width$} │ {}\n",
        span.start.line,
        lines[line_idx],
        width = line_num_width
    );

    result.push_str(&" ".repeat(line_num_width));
    result.push_str(" │ ");
    result.push_str(&" ".repeat(span.start.column.saturating_sub(1)));

    let marker_len = if span.start.line == span.end.line {
        span.end.column.saturating_sub(span.start.column).max(1)
    } else {
        1
    };
    result.push_str(&"^".repeat(marker_len));

    result
}
