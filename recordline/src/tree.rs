//! Parse tree for record literals
//!
//! The parser produces a concrete tree that mirrors the grammar productions
//! one-to-one. The interpreter pattern-matches over [`Node`], so every node
//! kind a provider can produce is listed here.
//!
//! ```text
//! logs   := record EOF
//! record := STRING '{' fields? '}'
//! fields := field (',' field)*
//! field  := STRING '=' val | STRING '='
//! val    := url | record | run+ | '{' '}' | '[' ']'
//!         | '[' record (',' record)* ']' | OPTIONAL '[' val ']'
//! url    := URL
//! run    := any single token of free-form text
//! ```

use crate::position::Span;
use std::fmt;

/// Grammar rule of an interior node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Logs,
    Record,
    Fields,
    Field,
    Val,
    Url,
    StringRun,
}

/// Token type of a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// Class or field name
    String,
    Equals,
    LeftCurly,
    RightCurly,
    LeftSquare,
    RightSquare,
    Comma,
    Optional,
    Url,
    /// Piece of free-form text inside a string run
    Text,
    Eof,
}

/// A node of the parse tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule {
        rule: Rule,
        children: Vec<Node>,
        span: Span,
    },
    Terminal {
        terminal: Terminal,
        text: String,
        span: Span,
    },
}

impl Node {
    /// Interior node; the span covers all children
    pub fn rule(rule: Rule, children: Vec<Node>) -> Self {
        let span = children
            .iter()
            .map(Node::span)
            .reduce(Span::merge)
            .unwrap_or_default();
        Node::Rule { rule, children, span }
    }

    pub fn terminal(terminal: Terminal, text: impl Into<String>, span: Span) -> Self {
        Node::Terminal { terminal, text: text.into(), span }
    }

    pub fn span(&self) -> Span {
        match self {
            Node::Rule { span, .. } | Node::Terminal { span, .. } => *span,
        }
    }

    /// Children of an interior node; empty for terminals
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Rule { children, .. } => children,
            Node::Terminal { .. } => &[],
        }
    }

    pub fn as_rule(&self) -> Option<Rule> {
        match self {
            Node::Rule { rule, .. } => Some(*rule),
            Node::Terminal { .. } => None,
        }
    }

    pub fn as_terminal(&self) -> Option<Terminal> {
        match self {
            Node::Terminal { terminal, .. } => Some(*terminal),
            Node::Rule { .. } => None,
        }
    }

    pub fn is_rule(&self, rule: Rule) -> bool {
        self.as_rule() == Some(rule)
    }

    pub fn is_terminal(&self, terminal: Terminal) -> bool {
        self.as_terminal() == Some(terminal)
    }

    /// Raw text of the subtree: the concatenated text of its terminals
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Terminal { text, .. } => out.push_str(text),
            Node::Rule { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Node::Rule { rule, children, .. } => {
                write!(f, "({:?}", rule)?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                write!(f, ")")
            }
            Node::Terminal { terminal: Terminal::Eof, .. } => write!(f, "<EOF>"),
            Node::Terminal { text, .. } => write!(f, "{:?}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn at(start: usize, end: usize) -> Span {
        Span::new(Position::new(1, start + 1, start), Position::new(1, end + 1, end))
    }

    #[test]
    fn test_rule_span_covers_children() {
        let node = Node::rule(
            Rule::Record,
            vec![
                Node::terminal(Terminal::String, "A", at(0, 1)),
                Node::terminal(Terminal::LeftCurly, "{", at(1, 2)),
                Node::terminal(Terminal::RightCurly, "}", at(2, 3)),
            ],
        );
        assert_eq!(node.span(), at(0, 3));
        assert_eq!(node.text(), "A{}");
        assert!(node.is_rule(Rule::Record));
        assert_eq!(node.children().len(), 3);
    }

    #[test]
    fn test_terminal_accessors() {
        let node = Node::terminal(Terminal::Comma, ",", at(0, 1));
        assert!(node.is_terminal(Terminal::Comma));
        assert_eq!(node.as_rule(), None);
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_display_is_s_expression() {
        let node = Node::rule(
            Rule::Logs,
            vec![
                Node::rule(Rule::Record, vec![Node::terminal(Terminal::String, "A", at(0, 1))]),
                Node::terminal(Terminal::Eof, "", at(1, 1)),
            ],
        );
        assert_eq!(node.to_string(), "(Logs (Record \"A\") <EOF>)");
    }
}
