//! Recursive descent parser for record literals
//!
//! Builds the concrete [`Node`] tree the interpreter consumes. The parser
//! decides where values end; it does not decide what they mean. Shapes the
//! interpreter rejects (for example a record list with a plain-text element)
//! are still emitted so the rejection happens in one place.

use crate::config::Options;
use crate::error::ParseError;
use crate::position::Span;
use crate::token::{Token, TokenKind};
use crate::tokenizer::Tokenizer;
use crate::tree::{Node, Rule, Terminal};
use tracing::trace;

static EOF: TokenKind = TokenKind::Eof;

/// Source of parse trees for the interpreter.
///
/// [`RecordParser`] is the built-in grammar; other providers can be plugged
/// into [`crate::host`] as long as they emit the same node shapes.
pub trait TreeProvider {
    fn parse_tree(&self, input: &str, options: &Options) -> Result<Node, ParseError>;
}

/// The built-in record-literal grammar
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordParser;

impl TreeProvider for RecordParser {
    fn parse_tree(&self, input: &str, options: &Options) -> Result<Node, ParseError> {
        parse_tree_with(input, options)
    }
}

/// Where a run of free-form text sits, which decides what a comma means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunContext {
    /// Field value: a comma ends the value only when a `name=` follows
    Field,
    /// Element of a record list: every top-level comma separates
    Element,
    /// Inside `Optional[...]`: only the closing bracket ends the value
    Optional,
}

/// Parser for one log line
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    /// Create a parser from a token stream
    pub fn new(mut tokens: Vec<Token>, options: &Options) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, Span::single(end)));
        }
        Self {
            tokens,
            position: 0,
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    /// Create a parser from source text
    pub fn from_source(input: &str, options: &Options) -> Self {
        Self::new(Tokenizer::new(input).tokenize(), options)
    }

    // `tokens` always ends with Eof and `position` never moves past it
    fn current(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn kind_at(&self, index: usize) -> &TokenKind {
        self.tokens.get(index).map(|t| &t.kind).unwrap_or(&EOF)
    }

    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while self.current_kind().is_whitespace() {
            self.advance();
        }
    }

    /// Index of the first non-whitespace token at or after `index`
    fn next_significant(&self, mut index: usize) -> usize {
        while self.kind_at(index).is_whitespace() {
            index += 1;
        }
        index
    }

    /// Consume the current token as a leaf of the given type
    fn terminal(&mut self, terminal: Terminal) -> Node {
        let token = self.current();
        let node = Node::terminal(terminal, token.text(), token.span);
        self.advance();
        node
    }

    fn error_here(&self, expected: &str) -> ParseError {
        let token = self.current();
        match token.kind {
            TokenKind::Eof => ParseError::UnexpectedEof { pos: token.span.start },
            ref kind => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: kind.to_string(),
                span: token.span,
            },
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::NestingTooDeep {
                max: self.max_depth,
                span: self.current().span,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Is this the start of a nested record (`Name{`)?
    fn record_starts_at(&self, index: usize) -> bool {
        matches!(self.kind_at(index), TokenKind::Word(_))
            && matches!(self.kind_at(index + 1), TokenKind::LeftBrace)
    }

    /// In a field, a comma not followed by `name=` is text, including a
    /// trailing one before `}`
    fn comma_ends_value(&self, comma: usize, context: RunContext) -> bool {
        match context {
            RunContext::Field => {
                let next = self.next_significant(comma + 1);
                matches!(self.kind_at(next), TokenKind::Word(_))
                    && matches!(self.kind_at(next + 1), TokenKind::Equals)
            }
            RunContext::Element => true,
            RunContext::Optional => false,
        }
    }

    /// Would a value end at `index` when no brackets are open?
    fn ends_value(&self, index: usize, context: RunContext) -> bool {
        match self.kind_at(index) {
            TokenKind::Eof | TokenKind::RightBrace | TokenKind::RightBracket => true,
            TokenKind::Comma => self.comma_ends_value(index, context),
            _ => false,
        }
    }

    /// Does the bracket at `open` start a record list?
    ///
    /// True when any top-level element starts with `Name{` and the matching
    /// `]` ends the value. A bracket group with no record element, or one that
    /// runs on into more text, stays free-form text.
    fn record_list_at(&self, open: usize, context: RunContext) -> bool {
        let (mut curly, mut square) = (0usize, 0usize);
        let mut element_start = true;
        let mut has_record = false;
        let mut index = open + 1;

        loop {
            let kind = self.kind_at(index);
            if kind.is_whitespace() {
                index += 1;
                continue;
            }
            if element_start && curly == 0 && square == 0 && self.record_starts_at(index) {
                has_record = true;
            }
            element_start = false;

            match kind {
                TokenKind::Eof => return false,
                TokenKind::LeftBrace => curly += 1,
                TokenKind::RightBrace if curly == 0 => return false,
                TokenKind::RightBrace => curly -= 1,
                TokenKind::LeftBracket => square += 1,
                TokenKind::RightBracket if square > 0 => square -= 1,
                TokenKind::RightBracket if curly > 0 => return false,
                TokenKind::RightBracket => {
                    return has_record && self.ends_value(self.next_significant(index + 1), context)
                }
                TokenKind::Comma if curly == 0 && square == 0 => element_start = true,
                _ => {}
            }
            index += 1;
        }
    }

    /// Parse a complete line: `record EOF`
    pub fn parse(&mut self) -> Result<Node, ParseError> {
        self.skip_whitespace();
        if matches!(self.current_kind(), TokenKind::Eof) {
            return Err(ParseError::EmptyInput);
        }

        let record = self.parse_record()?;

        self.skip_whitespace();
        if !matches!(self.current_kind(), TokenKind::Eof) {
            return Err(self.error_here("end of input"));
        }
        let eof = self.terminal(Terminal::Eof);

        Ok(Node::rule(Rule::Logs, vec![record, eof]))
    }

    /// `Name{ fields? }`
    fn parse_record(&mut self) -> Result<Node, ParseError> {
        self.enter()?;
        let result = self.parse_record_body();
        self.depth -= 1;
        result
    }

    fn parse_record_body(&mut self) -> Result<Node, ParseError> {
        if !matches!(self.current_kind(), TokenKind::Word(_)) {
            return Err(self.error_here("record name"));
        }
        let identifier = self.terminal(Terminal::String);

        if !matches!(self.current_kind(), TokenKind::LeftBrace) {
            return Err(self.error_here("'{'"));
        }
        let mut children = vec![identifier, self.terminal(Terminal::LeftCurly)];

        self.skip_whitespace();
        if !matches!(self.current_kind(), TokenKind::RightBrace) {
            children.push(self.parse_fields()?);
            self.skip_whitespace();
        }

        if !matches!(self.current_kind(), TokenKind::RightBrace) {
            return Err(self.error_here("',' or '}'"));
        }
        children.push(self.terminal(Terminal::RightCurly));

        Ok(Node::rule(Rule::Record, children))
    }

    /// `field (',' field)*`
    fn parse_fields(&mut self) -> Result<Node, ParseError> {
        let mut children = vec![self.parse_field()?];

        loop {
            self.skip_whitespace();
            if !matches!(self.current_kind(), TokenKind::Comma) {
                break;
            }
            children.push(self.terminal(Terminal::Comma));
            self.skip_whitespace();
            children.push(self.parse_field()?);
        }

        Ok(Node::rule(Rule::Fields, children))
    }

    /// `name=value` or `name=`
    fn parse_field(&mut self) -> Result<Node, ParseError> {
        if !matches!(self.current_kind(), TokenKind::Word(_)) {
            return Err(self.error_here("field name"));
        }
        let name = self.terminal(Terminal::String);

        if !matches!(self.current_kind(), TokenKind::Equals) {
            return Err(self.error_here("'='"));
        }
        let equals = self.terminal(Terminal::Equals);

        self.skip_whitespace();
        if matches!(
            self.current_kind(),
            TokenKind::Comma | TokenKind::RightBrace | TokenKind::Eof
        ) {
            return Ok(Node::rule(Rule::Field, vec![name, equals]));
        }

        let value = self.parse_val(RunContext::Field)?;
        Ok(Node::rule(Rule::Field, vec![name, equals, value]))
    }

    fn parse_val(&mut self, context: RunContext) -> Result<Node, ParseError> {
        let after_current = self.next_significant(self.position + 1);

        let children = match self.current_kind() {
            TokenKind::Url(_) if self.ends_value(after_current, context) => {
                vec![Node::rule(Rule::Url, vec![self.terminal(Terminal::Url)])]
            }
            TokenKind::Word(_) if self.record_starts_at(self.position) => {
                vec![self.parse_record()?]
            }
            TokenKind::Optional => self.parse_optional()?,
            TokenKind::LeftBrace if matches!(self.kind_at(after_current), TokenKind::RightBrace) => {
                let open = self.terminal(Terminal::LeftCurly);
                self.skip_whitespace();
                vec![open, self.terminal(Terminal::RightCurly)]
            }
            TokenKind::LeftBracket => match self.kind_at(after_current) {
                TokenKind::RightBracket => {
                    let open = self.terminal(Terminal::LeftSquare);
                    self.skip_whitespace();
                    vec![open, self.terminal(Terminal::RightSquare)]
                }
                _ if self.record_list_at(self.position, context) => self.parse_record_list()?,
                _ => self.parse_runs(context)?,
            },
            _ => self.parse_runs(context)?,
        };

        trace!(value = %children.iter().map(Node::text).collect::<String>(), "parsed value");
        Ok(Node::rule(Rule::Val, children))
    }

    /// `[ Rec{..}, element, ... ]`, where later elements may be non-records
    fn parse_record_list(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut children = vec![self.terminal(Terminal::LeftSquare)];

        loop {
            self.skip_whitespace();
            if self.record_starts_at(self.position) {
                children.push(self.parse_record()?);
            } else {
                children.extend(self.parse_runs(RunContext::Element)?);
            }

            self.skip_whitespace();
            match self.current_kind() {
                TokenKind::Comma => children.push(self.terminal(Terminal::Comma)),
                TokenKind::RightBracket => {
                    children.push(self.terminal(Terminal::RightSquare));
                    break;
                }
                _ => return Err(self.error_here("',' or ']'")),
            }
        }

        Ok(children)
    }

    /// `Optional[value]`
    fn parse_optional(&mut self) -> Result<Vec<Node>, ParseError> {
        let marker = self.terminal(Terminal::Optional);
        if !matches!(self.current_kind(), TokenKind::LeftBracket) {
            return Err(self.error_here("'['"));
        }
        let open = self.terminal(Terminal::LeftSquare);

        self.enter()?;
        self.skip_whitespace();
        let inner = self.parse_val(RunContext::Optional);
        self.depth -= 1;
        let inner = inner?;

        self.skip_whitespace();
        if !matches!(self.current_kind(), TokenKind::RightBracket) {
            return Err(self.error_here("']'"));
        }
        let close = self.terminal(Terminal::RightSquare);

        Ok(vec![marker, open, inner, close])
    }

    /// Free-form text up to the end of the value, one run per token.
    ///
    /// Brackets opened inside the text must close inside it; whitespace is
    /// kept only between other runs.
    fn parse_runs(&mut self, context: RunContext) -> Result<Vec<Node>, ParseError> {
        let mut runs = Vec::new();
        let mut pending_whitespace = Vec::new();
        let (mut curly, mut square) = (0usize, 0usize);

        loop {
            match self.current_kind() {
                TokenKind::Eof => break,
                TokenKind::RightBrace if curly == 0 => break,
                TokenKind::RightBracket if square == 0 => break,
                TokenKind::Comma
                    if curly == 0 && square == 0 && self.comma_ends_value(self.position, context) =>
                {
                    break
                }
                TokenKind::Whitespace(_) => {
                    pending_whitespace.push(self.run());
                    continue;
                }
                TokenKind::LeftBrace => curly += 1,
                TokenKind::RightBrace => curly -= 1,
                TokenKind::LeftBracket => square += 1,
                TokenKind::RightBracket => square -= 1,
                _ => {}
            }
            runs.append(&mut pending_whitespace);
            runs.push(self.run());
        }

        if runs.is_empty() {
            return Err(self.error_here("value"));
        }
        Ok(runs)
    }

    fn run(&mut self) -> Node {
        Node::rule(Rule::StringRun, vec![self.terminal(Terminal::Text)])
    }
}

/// Parse a log line into a tree with default options
pub fn parse_tree(input: &str) -> Result<Node, ParseError> {
    parse_tree_with(input, &Options::default())
}

/// Parse a log line into a tree
pub fn parse_tree_with(input: &str, options: &Options) -> Result<Node, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut parser = Parser::from_source(input, options);
    trace!(tokens = parser.tokens.len(), "tokenized line");
    parser.parse()
}
