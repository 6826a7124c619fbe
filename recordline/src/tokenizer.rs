//! Lexical analysis for record literals
//!
//! Every character of the input lands in exactly one token, so concatenating
//! token texts reproduces the source. The tokenizer itself never fails;
//! deciding what a run of words means is the parser's job.

use crate::position::{Position, Span};
use crate::token::{Token, TokenKind};

/// Tokenizer for a single log line
pub struct Tokenizer {
    input: Vec<char>,
    index: usize,
    pos: Position,
}

impl Tokenizer {
    /// Create a new tokenizer for the given input
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            index: 0,
            pos: Position::start(),
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.index).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.index + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.index += 1;
        self.pos.advance(ch);
        Some(ch)
    }

    fn is_delimiter(ch: char) -> bool {
        matches!(ch, '=' | ',' | '{' | '}' | '[' | ']')
    }

    fn read_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if !keep(ch) {
                break;
            }
            result.push(ch);
            self.advance();
        }
        result
    }

    /// Length of a `scheme://` prefix starting at the current char, if any
    fn url_scheme_len(&self) -> Option<usize> {
        if !self.current_char()?.is_ascii_alphabetic() {
            return None;
        }
        let mut len = 1;
        while let Some(ch) = self.peek_char(len) {
            if ch.is_ascii_alphanumeric() || matches!(ch, '+' | '.' | '-') {
                len += 1;
            } else {
                break;
            }
        }
        let separator = [self.peek_char(len), self.peek_char(len + 1), self.peek_char(len + 2)];
        (separator == [Some(':'), Some('/'), Some('/')]).then_some(len + 3)
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        let start = self.pos;

        let kind = match self.current_char() {
            None => return Token::new(TokenKind::Eof, Span::single(start)),
            Some(ch) if ch.is_whitespace() => {
                TokenKind::Whitespace(self.read_while(char::is_whitespace))
            }
            Some(ch) if Self::is_delimiter(ch) => {
                self.advance();
                match ch {
                    '=' => TokenKind::Equals,
                    ',' => TokenKind::Comma,
                    '{' => TokenKind::LeftBrace,
                    '}' => TokenKind::RightBrace,
                    '[' => TokenKind::LeftBracket,
                    _ => TokenKind::RightBracket,
                }
            }
            Some(_) if self.url_scheme_len().is_some() => {
                // `=` is allowed inside query strings
                TokenKind::Url(self.read_while(|c| {
                    !c.is_whitespace() && !matches!(c, ',' | '{' | '}' | '[' | ']')
                }))
            }
            Some(_) => {
                let word = self.read_while(|c| !c.is_whitespace() && !Self::is_delimiter(c));
                if word == "Optional" && self.current_char() == Some('[') {
                    TokenKind::Optional
                } else {
                    TokenKind::Word(word)
                }
            }
        };

        Token::new(kind, Span::new(start, self.pos))
    }

    /// Tokenize the entire input, ending with a single `Eof` token
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}
