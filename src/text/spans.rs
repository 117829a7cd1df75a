//! Span extraction: flatten a text into runs and control markers
//!
//! Consecutive characters coalesce into a single [`Span::Text`]; every
//! control element becomes its own [`Span::Control`], never merged with
//! its neighbours. An empty text yields no spans at all.

use super::Payloads;
use crate::crdt::{Attributes, Payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::iter::Peekable;

/// One item of a flattened text
///
/// Serialized untagged, so a span list reads like
/// `["hello", {"bold": true}, " world"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Span {
    Text(String),
    Control(Attributes),
}

impl Span {
    pub fn control<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Span::Control(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Span::Text(text) => Some(text),
            Span::Control(_) => None,
        }
    }
}

impl From<&str> for Span {
    fn from(text: &str) -> Self {
        Span::Text(text.to_string())
    }
}

/// Lazy span iterator returned by [`Text::to_spans`](super::Text::to_spans)
///
/// Cloning the iterator restarts from the clone point, so the same
/// flattening can be walked more than once.
#[derive(Clone)]
pub struct Spans<'a> {
    payloads: Peekable<Payloads<'a>>,
}

impl<'a> Spans<'a> {
    pub(crate) fn new(payloads: Payloads<'a>) -> Self {
        Self {
            payloads: payloads.peekable(),
        }
    }
}

impl Iterator for Spans<'_> {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        match self.payloads.next()? {
            Payload::Control(attrs) => Some(Span::Control(attrs.clone())),
            Payload::Char(first) => {
                let mut run = String::new();
                run.push(*first);
                while let Some(Payload::Char(ch)) = self
                    .payloads
                    .next_if(|payload| matches!(payload, Payload::Char(_)))
                {
                    run.push(*ch);
                }
                Some(Span::Text(run))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::text::{EditText, Text};
    use crate::{Payload, Span};
    use serde_json::json;

    #[test]
    fn test_plain_text_is_single_span() {
        let text = Text::from("hello world");
        let spans: Vec<Span> = text.to_spans().collect();
        assert_eq!(spans, vec![Span::from("hello world")]);
    }

    #[test]
    fn test_empty_text_has_no_spans() {
        assert_eq!(Text::new().to_spans().count(), 0);
    }

    #[test]
    fn test_split_at_control() {
        let mut text = Text::from("hello world");
        text.insert_at(5, [Payload::control([("attribute", json!("bold"))])])
            .unwrap();

        let spans: Vec<Span> = text.to_spans().collect();
        assert_eq!(
            spans,
            vec![
                Span::from("hello"),
                Span::control([("attribute", json!("bold"))]),
                Span::from(" world"),
            ]
        );
    }

    #[test]
    fn test_consecutive_controls_stay_separate() {
        let mut text = Text::from("hello world");
        text.insert_at(5, [Payload::control([("attribute", json!("bold"))])])
            .unwrap();
        text.insert_at(6, [Payload::control([("attribute", json!("italic"))])])
            .unwrap();

        let spans: Vec<Span> = text.to_spans().collect();
        assert_eq!(
            spans,
            vec![
                Span::from("hello"),
                Span::control([("attribute", json!("bold"))]),
                Span::control([("attribute", json!("italic"))]),
                Span::from(" world"),
            ]
        );
    }

    #[test]
    fn test_trailing_control() {
        let mut text = Text::from("hello world");
        text.insert_at(5, [Payload::control([("attribute", json!("bold"))])])
            .unwrap();
        text.insert_at(12, [Payload::control([("attribute", json!("italic"))])])
            .unwrap();

        let spans: Vec<Span> = text.to_spans().collect();
        assert_eq!(
            spans,
            vec![
                Span::from("hello"),
                Span::control([("attribute", json!("bold"))]),
                Span::from(" world"),
                Span::control([("attribute", json!("italic"))]),
            ]
        );
    }

    #[test]
    fn test_spans_restart() {
        let text = Text::from("abc");
        let spans = text.to_spans();
        assert_eq!(spans.clone().count(), 1);
        assert_eq!(spans.count(), 1);
        assert_eq!(text.to_spans().next(), Some(Span::from("abc")));
    }

    #[test]
    fn test_span_serialization() {
        let spans = vec![
            Span::from("Hello "),
            Span::control([("bold", json!(true))]),
            Span::from("reader"),
            Span::control([("bold", json!(null))]),
        ];
        let json = serde_json::to_value(&spans).unwrap();
        assert_eq!(
            json,
            json!(["Hello ", {"bold": true}, "reader", {"bold": null}])
        );
    }
}
