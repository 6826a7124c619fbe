//! Semantic interpreter: parse tree → value model
//!
//! The grammar overloads its punctuation: `{` may open a record body or an
//! empty object, `[` an empty array, a record list or the inside of an
//! `Optional`. Each rule below resolves one production by matching on child
//! count and node kind. The first mismatch aborts the whole line with a
//! structural error; nothing is recovered or guessed.

use crate::config::Options;
use crate::error::InterpretError;
use crate::tree::{Node, Rule, Terminal};
use crate::value::{Field, Record, Value};
use tracing::{debug, trace};

/// Walks one parse tree. Holds only the current nesting depth.
#[derive(Debug)]
pub struct Interpreter {
    max_depth: usize,
    depth: usize,
}

impl Interpreter {
    pub fn new(options: &Options) -> Self {
        Self {
            max_depth: options.max_depth,
            depth: 0,
        }
    }

    /// Root rule: a record followed by the end-of-input marker
    pub fn interpret(&mut self, root: &Node) -> Result<Record, InterpretError> {
        self.depth = 0;
        let record = match root {
            Node::Rule { rule: Rule::Logs, children, .. } => match children.as_slice() {
                [record, eof] if record.is_rule(Rule::Record) && eof.is_terminal(Terminal::Eof) => {
                    self.record(record)?
                }
                _ => return Err(structural("expected record then terminator", root)),
            },
            _ => return Err(structural("expected record then terminator", root)),
        };

        debug!(
            identifier = %record.identifier,
            fields = record.fields.len(),
            "interpreted record"
        );
        Ok(record)
    }

    fn enter(&mut self, node: &Node) -> Result<(), InterpretError> {
        if self.depth >= self.max_depth {
            return Err(structural(
                format!("nesting too deep (max {})", self.max_depth),
                node,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn record(&mut self, node: &Node) -> Result<Record, InterpretError> {
        self.enter(node)?;
        let result = self.record_body(node);
        self.depth -= 1;
        result
    }

    fn record_body(&mut self, node: &Node) -> Result<Record, InterpretError> {
        let children = node.children();
        let identifier = match children.first() {
            Some(Node::Terminal { terminal: Terminal::String, text, .. }) => text.clone(),
            _ => return Err(structural("expected identifier", node)),
        };

        let fields = match children {
            [_, open, close] if is_braces(open, close) => Vec::new(),
            [_, open, fields, close] if is_braces(open, close) => {
                if !fields.is_rule(Rule::Fields) {
                    return Err(structural("expected fields", fields));
                }
                self.fields(fields)?
            }
            _ => return Err(structural("malformed record", node)),
        };

        Ok(Record { identifier, fields })
    }

    fn fields(&mut self, node: &Node) -> Result<Vec<Field>, InterpretError> {
        let mut fields = Vec::new();
        for child in node.children() {
            match child {
                Node::Rule { rule: Rule::Field, .. } => fields.push(self.field(child)?),
                Node::Terminal { terminal: Terminal::Comma, .. } => {}
                _ => return Err(structural("expected field or separator", child)),
            }
        }
        Ok(fields)
    }

    fn field(&mut self, node: &Node) -> Result<Field, InterpretError> {
        match node.children() {
            [Node::Terminal { terminal: Terminal::String, text, .. }, _] => {
                Ok(Field::new(text.clone(), Value::Nothing))
            }
            [Node::Terminal { terminal: Terminal::String, text, .. }, equals, val]
                if equals.is_terminal(Terminal::Equals) && val.is_rule(Rule::Val) =>
            {
                Ok(Field::new(text.clone(), self.val(val)?))
            }
            _ => Err(structural("expected identifier = value", node)),
        }
    }

    /// Dispatch on the first child of a `Val` node
    fn val(&mut self, node: &Node) -> Result<Value, InterpretError> {
        let children = node.children();
        let Some(first) = children.first() else {
            return Err(structural("unrecognized value form", node));
        };

        match first {
            Node::Rule { rule, .. } => match rule {
                Rule::Url => {
                    trace!("url value");
                    Ok(Value::Url(first.text()))
                }
                Rule::Record => {
                    trace!("record value");
                    Ok(Value::Record(self.record(first)?))
                }
                Rule::StringRun => {
                    trace!(runs = children.len(), "text value");
                    text(node)
                }
                Rule::Logs | Rule::Fields | Rule::Field | Rule::Val => {
                    Err(structural("unrecognized value form", first))
                }
            },
            Node::Terminal { terminal, .. } => match terminal {
                Terminal::LeftCurly => {
                    trace!("empty object");
                    empty_object(node)
                }
                Terminal::LeftSquare => {
                    trace!("array value");
                    self.array(node)
                }
                Terminal::Optional => {
                    trace!("optional value");
                    self.optional(node)
                }
                Terminal::String
                | Terminal::Equals
                | Terminal::RightCurly
                | Terminal::RightSquare
                | Terminal::Comma
                | Terminal::Url
                | Terminal::Text
                | Terminal::Eof => Err(structural("unrecognized value form", first)),
            },
        }
    }

    /// `[]` or `[Rec{..}, Rec{..}, ...]`
    fn array(&mut self, node: &Node) -> Result<Value, InterpretError> {
        const MESSAGE: &str = "array must contain only records and separators";

        let elements = match node.children() {
            [_, close] if close.is_terminal(Terminal::RightSquare) => return Ok(Value::EmptyArray),
            [_, elements @ .., close] if close.is_terminal(Terminal::RightSquare) => elements,
            _ => return Err(structural(MESSAGE, node)),
        };

        let mut records = Vec::new();
        for element in elements {
            match element {
                Node::Rule { rule: Rule::Record, .. } => records.push(self.record(element)?),
                Node::Terminal { terminal: Terminal::Comma, .. } => {}
                _ => return Err(structural(MESSAGE, element)),
            }
        }

        if records.is_empty() {
            return Err(structural(MESSAGE, node));
        }
        Ok(Value::RecordList(records))
    }

    /// `Optional[value]` is transparent: the wrapped value is returned as is
    fn optional(&mut self, node: &Node) -> Result<Value, InterpretError> {
        match node.children().get(2) {
            Some(inner) if inner.is_rule(Rule::Val) => {
                self.enter(inner)?;
                let value = self.val(inner);
                self.depth -= 1;
                value
            }
            _ => Err(structural("optional requires inner value", node)),
        }
    }
}

fn structural(message: impl Into<String>, node: &Node) -> InterpretError {
    InterpretError::structural(message, node.span())
}

fn is_braces(open: &Node, close: &Node) -> bool {
    open.is_terminal(Terminal::LeftCurly) && close.is_terminal(Terminal::RightCurly)
}

/// Every child must be a string run; their raw texts are concatenated
fn text(node: &Node) -> Result<Value, InterpretError> {
    let mut out = String::new();
    for run in node.children() {
        if !run.is_rule(Rule::StringRun) {
            return Err(structural("expected only string runs", run));
        }
        out.push_str(&run.text());
    }
    Ok(Value::Text(out))
}

fn empty_object(node: &Node) -> Result<Value, InterpretError> {
    match node.children() {
        [_, close] if close.is_terminal(Terminal::RightCurly) => Ok(Value::EmptyObject),
        _ => Err(structural("object literal must be empty", node)),
    }
}

/// Interpret a parse tree with default options
pub fn interpret(tree: &Node) -> Result<Record, InterpretError> {
    interpret_with(tree, &Options::default())
}

pub fn interpret_with(tree: &Node, options: &Options) -> Result<Record, InterpretError> {
    Interpreter::new(options).interpret(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Span;

    fn t(terminal: Terminal, text: &str) -> Node {
        Node::terminal(terminal, text, Span::default())
    }

    fn r(rule: Rule, children: Vec<Node>) -> Node {
        Node::rule(rule, children)
    }

    fn logs(record: Node) -> Node {
        r(Rule::Logs, vec![record, t(Terminal::Eof, "")])
    }

    fn record(name: &str, fields: Vec<Node>) -> Node {
        let mut children = vec![t(Terminal::String, name), t(Terminal::LeftCurly, "{")];
        if !fields.is_empty() {
            let mut list = Vec::new();
            for (i, field) in fields.into_iter().enumerate() {
                if i > 0 {
                    list.push(t(Terminal::Comma, ","));
                }
                list.push(field);
            }
            children.push(r(Rule::Fields, list));
        }
        children.push(t(Terminal::RightCurly, "}"));
        r(Rule::Record, children)
    }

    fn field(name: &str, val: Node) -> Node {
        r(Rule::Field, vec![t(Terminal::String, name), t(Terminal::Equals, "="), val])
    }

    fn runs(parts: &[&str]) -> Node {
        r(
            Rule::Val,
            parts
                .iter()
                .map(|p| r(Rule::StringRun, vec![t(Terminal::Text, p)]))
                .collect(),
        )
    }

    fn url(text: &str) -> Node {
        r(Rule::Val, vec![r(Rule::Url, vec![t(Terminal::Url, text)])])
    }

    fn structural_message(result: Result<Record, InterpretError>) -> String {
        match result {
            Err(InterpretError::Structural { message, .. }) => message,
            other => panic!("Expected structural error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_record() {
        let result = interpret(&logs(record("User", vec![]))).unwrap();
        assert_eq!(result, Record::new("User"));
    }

    #[test]
    fn test_text_runs_concatenate() {
        let tree = logs(record("A", vec![field("t", runs(&["is", " ", "<", " ", "5.00"]))]));
        let result = interpret(&tree).unwrap();
        assert_eq!(result.get_text("t"), Some("is < 5.00"));
    }

    #[test]
    fn test_field_without_assignment_is_nothing() {
        let bare = r(Rule::Field, vec![t(Terminal::String, "x"), t(Terminal::Equals, "=")]);
        let result = interpret(&logs(record("A", vec![bare]))).unwrap();
        assert_eq!(result.get("x"), Some(&Value::Nothing));
    }

    #[test]
    fn test_root_must_be_record_then_eof() {
        let missing_eof = r(Rule::Logs, vec![record("A", vec![])]);
        assert_eq!(
            structural_message(interpret(&missing_eof)),
            "expected record then terminator"
        );
        assert_eq!(
            structural_message(interpret(&record("A", vec![]))),
            "expected record then terminator"
        );
    }

    #[test]
    fn test_record_without_identifier() {
        let node = r(
            Rule::Record,
            vec![t(Terminal::LeftCurly, "{"), t(Terminal::RightCurly, "}"), t(Terminal::Eof, "")],
        );
        assert_eq!(structural_message(interpret(&logs(node))), "expected identifier");
    }

    #[test]
    fn test_record_with_five_children() {
        let node = r(
            Rule::Record,
            vec![
                t(Terminal::String, "A"),
                t(Terminal::LeftCurly, "{"),
                r(Rule::Fields, vec![]),
                r(Rule::Fields, vec![]),
                t(Terminal::RightCurly, "}"),
            ],
        );
        assert_eq!(structural_message(interpret(&logs(node))), "malformed record");
    }

    #[test]
    fn test_record_third_child_must_be_fields() {
        let node = r(
            Rule::Record,
            vec![
                t(Terminal::String, "A"),
                t(Terminal::LeftCurly, "{"),
                url("https://x"),
                t(Terminal::RightCurly, "}"),
            ],
        );
        assert_eq!(structural_message(interpret(&logs(node))), "expected fields");
    }

    #[test]
    fn test_fields_reject_stray_nodes() {
        let node = r(
            Rule::Record,
            vec![
                t(Terminal::String, "A"),
                t(Terminal::LeftCurly, "{"),
                r(Rule::Fields, vec![t(Terminal::Equals, "=")]),
                t(Terminal::RightCurly, "}"),
            ],
        );
        assert_eq!(structural_message(interpret(&logs(node))), "expected field or separator");
    }

    #[test]
    fn test_field_shape() {
        let bad = r(Rule::Field, vec![t(Terminal::String, "x"), t(Terminal::Comma, ","), url("u://")]);
        assert_eq!(
            structural_message(interpret(&logs(record("A", vec![bad])))),
            "expected identifier = value"
        );
    }

    #[test]
    fn test_unrecognized_value_form() {
        let val = r(Rule::Val, vec![t(Terminal::Equals, "=")]);
        assert_eq!(
            structural_message(interpret(&logs(record("A", vec![field("x", val)])))),
            "unrecognized value form"
        );
        let empty = r(Rule::Val, vec![]);
        assert_eq!(
            structural_message(interpret(&logs(record("A", vec![field("x", empty)])))),
            "unrecognized value form"
        );
    }

    #[test]
    fn test_text_must_be_all_runs() {
        let val = r(
            Rule::Val,
            vec![r(Rule::StringRun, vec![t(Terminal::Text, "a")]), t(Terminal::Comma, ",")],
        );
        assert_eq!(
            structural_message(interpret(&logs(record("A", vec![field("x", val)])))),
            "expected only string runs"
        );
    }

    #[test]
    fn test_empty_object_and_array() {
        let obj = r(Rule::Val, vec![t(Terminal::LeftCurly, "{"), t(Terminal::RightCurly, "}")]);
        let arr = r(Rule::Val, vec![t(Terminal::LeftSquare, "["), t(Terminal::RightSquare, "]")]);
        let result = interpret(&logs(record("A", vec![field("o", obj), field("a", arr)]))).unwrap();
        assert_eq!(result.get("o"), Some(&Value::EmptyObject));
        assert_eq!(result.get("a"), Some(&Value::EmptyArray));
    }

    #[test]
    fn test_object_with_content_is_rejected() {
        let obj = r(
            Rule::Val,
            vec![
                t(Terminal::LeftCurly, "{"),
                r(Rule::Fields, vec![]),
                t(Terminal::RightCurly, "}"),
            ],
        );
        assert_eq!(
            structural_message(interpret(&logs(record("A", vec![field("o", obj)])))),
            "object literal must be empty"
        );
    }

    #[test]
    fn test_record_list_keeps_order_and_duplicates() {
        let arr = r(
            Rule::Val,
            vec![
                t(Terminal::LeftSquare, "["),
                record("B", vec![]),
                t(Terminal::Comma, ","),
                record("C", vec![]),
                t(Terminal::Comma, ","),
                record("B", vec![]),
                t(Terminal::RightSquare, "]"),
            ],
        );
        let result = interpret(&logs(record("A", vec![field("l", arr)]))).unwrap();
        let names: Vec<&str> = result.get("l").unwrap().as_records().unwrap()
            .iter()
            .map(|r| r.identifier.as_str())
            .collect();
        assert_eq!(names, vec!["B", "C", "B"]);
    }

    #[test]
    fn test_mixed_array_fails() {
        let arr = r(
            Rule::Val,
            vec![
                t(Terminal::LeftSquare, "["),
                record("B", vec![]),
                t(Terminal::Comma, ","),
                r(Rule::StringRun, vec![t(Terminal::Text, "loose")]),
                t(Terminal::RightSquare, "]"),
            ],
        );
        assert_eq!(
            structural_message(interpret(&logs(record("A", vec![field("l", arr)])))),
            "array must contain only records and separators"
        );
    }

    #[test]
    fn test_optional_is_transparent() {
        let wrapped = r(
            Rule::Val,
            vec![
                t(Terminal::Optional, "Optional"),
                t(Terminal::LeftSquare, "["),
                url("https://h/p"),
                t(Terminal::RightSquare, "]"),
            ],
        );
        let a = interpret(&logs(record("A", vec![field("u", wrapped)]))).unwrap();
        let b = interpret(&logs(record("A", vec![field("u", url("https://h/p"))]))).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.get("u"), Some(&Value::Url("https://h/p".into())));
    }

    #[test]
    fn test_optional_requires_inner_val() {
        let wrapped = r(
            Rule::Val,
            vec![
                t(Terminal::Optional, "Optional"),
                t(Terminal::LeftSquare, "["),
                t(Terminal::RightSquare, "]"),
            ],
        );
        assert_eq!(
            structural_message(interpret(&logs(record("A", vec![field("u", wrapped)])))),
            "optional requires inner value"
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut node = record("Leaf", vec![]);
        for _ in 0..9 {
            node = record("Wrap", vec![field("inner", r(Rule::Val, vec![node]))]);
        }
        let tree = logs(node);

        assert_eq!(interpret_with(&tree, &Options::default()).unwrap().depth(), 10);
        assert_eq!(
            structural_message(interpret_with(&tree, &Options::default().with_max_depth(5))),
            "nesting too deep (max 5)"
        );
    }

    #[test]
    fn test_interpreter_is_reusable() {
        let tree = logs(record("A", vec![field("x", runs(&["1"]))]));
        let mut interpreter = Interpreter::new(&Options::default());
        assert_eq!(interpreter.interpret(&tree), interpreter.interpret(&tree));
    }
}
