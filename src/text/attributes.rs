//! Attribute accumulation: resolve control markers into attributed runs
//!
//! Walking the span list, every control marker updates a per-attribute
//! stack: a `null` value pops the front of that attribute's stack, any
//! other value pushes onto the front. A text run is formatted with the
//! front value of every non-empty stack.
//!
//! A close pops regardless of which value is on top, so it is not matched
//! against the open that produced the value. This is what lets two
//! replicas that concurrently bold overlapping ranges merge into one
//! continuous bold run: as long as the bold stack never empties between
//! the two ranges, the text between them stays bold.

use super::spans::Span;
use crate::crdt::Attributes;
use crate::protocol::InsertOp;
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};

/// Currently open formatting, one stack per attribute name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStack {
    stacks: BTreeMap<String, VecDeque<Value>>,
}

impl AttributeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a control marker
    ///
    /// Popping an attribute with nothing open leaves the stack empty.
    pub fn apply(&mut self, control: &Attributes) {
        for (name, value) in control {
            let stack = self.stacks.entry(name.clone()).or_default();
            if value.is_null() {
                stack.pop_front();
            } else {
                stack.push_front(value.clone());
            }
        }
    }

    /// Effective attributes: the front of every non-empty stack
    pub fn current(&self) -> Attributes {
        self.stacks
            .iter()
            .filter_map(|(name, stack)| stack.front().map(|value| (name.clone(), value.clone())))
            .collect()
    }

    /// Number of open layers for `name`
    pub fn depth(&self, name: &str) -> usize {
        self.stacks.get(name).map_or(0, VecDeque::len)
    }
}

/// Turn a span list into attributed insert operations
///
/// Adjacent runs with equal effective attributes are joined; runs without
/// attributes carry no `attributes` field.
pub fn accumulate<I>(spans: I) -> Vec<InsertOp>
where
    I: IntoIterator<Item = Span>,
{
    let mut stack = AttributeStack::new();
    let mut ops = Vec::new();
    let mut current = String::new();
    let mut attributes = Attributes::new();

    for span in spans {
        match span {
            Span::Control(control) => stack.apply(&control),
            Span::Text(text) => {
                let next = stack.current();
                if next == attributes {
                    current.push_str(&text);
                } else {
                    if !current.is_empty() {
                        ops.push(InsertOp::new(std::mem::take(&mut current), attributes));
                    }
                    attributes = next;
                    current = text;
                }
            }
        }
    }

    if !current.is_empty() {
        ops.push(InsertOp::new(current, attributes));
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn control(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_stack_push_pop() {
        let mut stack = AttributeStack::new();
        stack.apply(&control(json!({"bold": true})));
        stack.apply(&control(json!({"bold": "heavy"})));

        assert_eq!(stack.depth("bold"), 2);
        assert_eq!(stack.current(), control(json!({"bold": "heavy"})));

        stack.apply(&control(json!({"bold": null})));
        assert_eq!(stack.current(), control(json!({"bold": true})));

        stack.apply(&control(json!({"bold": null})));
        assert!(stack.current().is_empty());

        // Extra close on an empty stack is harmless
        stack.apply(&control(json!({"bold": null})));
        assert_eq!(stack.depth("bold"), 0);
    }

    #[test]
    fn test_close_pops_most_recent_layer() {
        let mut stack = AttributeStack::new();
        stack.apply(&control(json!({"color": "red"})));
        stack.apply(&control(json!({"color": "blue"})));
        stack.apply(&control(json!({"color": null})));

        // The close does not look at which value it closes
        assert_eq!(stack.current(), control(json!({"color": "red"})));
    }

    #[test]
    fn test_accumulate_plain_text() {
        let ops = accumulate(vec![Span::from("hello"), Span::from(" world")]);
        assert_eq!(ops, vec![InsertOp::new("hello world".to_string(), Attributes::new())]);
        assert!(ops[0].attributes.is_none());
    }

    #[test]
    fn test_accumulate_empty() {
        assert!(accumulate(Vec::new()).is_empty());
    }

    #[test]
    fn test_accumulate_gandalf() {
        let spans = vec![
            Span::control([("bold", json!(true))]),
            Span::from("Gandalf"),
            Span::control([("bold", json!(null))]),
            Span::from(" the "),
            Span::control([("color", json!("#cccccc"))]),
            Span::from("Grey"),
        ];

        let ops = accumulate(spans);
        assert_eq!(
            serde_json::to_value(&ops).unwrap(),
            json!([
                {"insert": "Gandalf", "attributes": {"bold": true}},
                {"insert": " the "},
                {"insert": "Grey", "attributes": {"color": "#cccccc"}},
            ])
        );
    }

    #[test]
    fn test_overlapping_opens_keep_run_continuous() {
        let spans = vec![
            Span::control([("bold", json!(true))]),
            Span::from("Gandalf "),
            Span::control([("bold", json!(true))]),
            Span::from("the"),
            Span::control([("bold", json!(null))]),
            Span::from(" Grey"),
            Span::control([("bold", json!(null))]),
        ];

        let ops = accumulate(spans);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].insert, "Gandalf the Grey");
        assert_eq!(ops[0].attributes, Some(control(json!({"bold": true}))));
    }

    #[test]
    fn test_controls_between_equal_runs_do_not_split() {
        let spans = vec![
            Span::from("ab"),
            Span::control([("italic", json!(true))]),
            Span::control([("italic", json!(null))]),
            Span::from("cd"),
        ];

        let ops = accumulate(spans);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].insert, "abcd");
    }
}
