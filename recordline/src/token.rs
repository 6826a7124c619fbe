//! Token types for record-literal lexical analysis

use crate::position::Span;
use std::fmt;

/// A token with its type and source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The exact source text of this token
    pub fn text(&self) -> &str {
        self.kind.text()
    }
}

/// The type of a token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Run of characters that are neither whitespace nor punctuation:
    /// class names, field names, and pieces of free-form text
    Word(String),
    /// `scheme://...` up to whitespace or structural punctuation
    Url(String),
    /// `Optional` directly followed by `[`
    Optional,

    Equals,       // =
    Comma,        // ,
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]

    Whitespace(String),
    Eof,
}

impl TokenKind {
    pub fn text(&self) -> &str {
        match self {
            TokenKind::Word(s) | TokenKind::Url(s) | TokenKind::Whitespace(s) => s,
            TokenKind::Optional => "Optional",
            TokenKind::Equals => "=",
            TokenKind::Comma => ",",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::Eof => "",
        }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, TokenKind::Whitespace(_))
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenKind::Word(s) => write!(f, "word '{}'", s),
            TokenKind::Url(s) => write!(f, "url '{}'", s),
            TokenKind::Optional => write!(f, "'Optional'"),
            TokenKind::Equals => write!(f, "'='"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::LeftBrace => write!(f, "'{{'"),
            TokenKind::RightBrace => write!(f, "'}}'"),
            TokenKind::LeftBracket => write!(f, "'['"),
            TokenKind::RightBracket => write!(f, "']'"),
            TokenKind::Whitespace(_) => write!(f, "whitespace"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}
