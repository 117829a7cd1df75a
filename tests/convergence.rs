// Property-based convergence tests
//
// Random edit scripts run on three replicas, with occasional syncs in
// between. Whatever the delivery order, every replica must end with the
// same visible content.

use proptest::prelude::*;
use serde_json::json;
use synckit_richtext::{Document, EditText, Payload, Span, Text};

const REPLICAS: usize = 3;

#[derive(Debug, Clone)]
enum Step {
    Insert { replica: usize, at: usize, text: String },
    Delete { replica: usize, at: usize, count: usize },
    Bold { replica: usize, at: usize, open: bool },
    Sync { from: usize, to: usize },
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (0..REPLICAS, any::<usize>(), "[a-z]{1,4}")
            .prop_map(|(replica, at, text)| Step::Insert { replica, at, text }),
        2 => (0..REPLICAS, any::<usize>(), 1usize..3)
            .prop_map(|(replica, at, count)| Step::Delete { replica, at, count }),
        1 => (0..REPLICAS, any::<usize>(), any::<bool>())
            .prop_map(|(replica, at, open)| Step::Bold { replica, at, open }),
        1 => (0..REPLICAS, 0..REPLICAS).prop_map(|(from, to)| Step::Sync { from, to }),
    ]
}

fn base_replicas() -> Vec<Document> {
    let base = Document::from_texts([("text", Text::from("seed"))]).unwrap();
    (0..REPLICAS)
        .map(|i| {
            Document::with_actor(format!("replica-{}", i))
                .merge(&base)
                .unwrap()
        })
        .collect()
}

fn edit(doc: &Document, step: &Step) -> Document {
    let (next, _) = doc
        .change(|tx| {
            let mut text = tx.text_mut("text").unwrap();
            let len = text.len();
            match step {
                Step::Insert { at, text: s, .. } => text.insert_str(at % (len + 1), s),
                Step::Delete { at, count, .. } if len > 0 => {
                    let at = at % len;
                    text.delete_at(at, (*count).min(len - at))
                }
                Step::Bold { at, open, .. } => {
                    let value = if *open { json!(true) } else { json!(null) };
                    text.insert_at(at % (len + 1), [Payload::control([("bold", value)])])
                }
                _ => Ok(()),
            }
        })
        .unwrap();
    next
}

fn run(steps: &[Step]) -> Vec<Document> {
    let mut docs = base_replicas();
    for step in steps {
        match step {
            Step::Insert { replica, .. }
            | Step::Delete { replica, .. }
            | Step::Bold { replica, .. } => {
                docs[*replica] = edit(&docs[*replica], step);
            }
            Step::Sync { from, to } => {
                docs[*to] = docs[*to].merge(&docs[*from]).unwrap();
            }
        }
    }
    docs
}

fn visible(doc: &Document) -> (Vec<Payload>, Vec<Span>) {
    let text = doc.text("text").unwrap();
    (text.iter().cloned().collect(), text.to_spans().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_merge_order_does_not_matter(steps in prop::collection::vec(step_strategy(), 0..40)) {
        let docs = run(&steps);

        let forward = docs[0].merge(&docs[1]).unwrap().merge(&docs[2]).unwrap();
        let backward = docs[2].merge(&docs[1]).unwrap().merge(&docs[0]).unwrap();
        let middle = docs[1].merge(&docs[0]).unwrap().merge(&docs[2]).unwrap();

        prop_assert_eq!(visible(&forward), visible(&backward));
        prop_assert_eq!(visible(&forward), visible(&middle));
        prop_assert_eq!(
            forward.text("text").unwrap().to_delta(),
            backward.text("text").unwrap().to_delta()
        );
        prop_assert_eq!(forward.clock(), backward.clock());
    }

    #[test]
    fn prop_merge_is_idempotent(steps in prop::collection::vec(step_strategy(), 0..30)) {
        let docs = run(&steps);

        let once = docs[0].merge(&docs[1]).unwrap();
        let twice = once.merge(&docs[1]).unwrap();
        let with_self = once.merge(&once).unwrap();

        prop_assert_eq!(visible(&once), visible(&twice));
        prop_assert_eq!(visible(&once), visible(&with_self));
        prop_assert_eq!(once.history().len(), twice.history().len());
    }

    #[test]
    fn prop_change_replay_matches_merge(steps in prop::collection::vec(step_strategy(), 0..30)) {
        let docs = run(&steps);

        let mut changes = docs[2].get_changes(&docs[0]);
        changes.reverse();
        let replayed = docs[0].apply_changes(changes).unwrap();
        let merged = docs[0].merge(&docs[2]).unwrap();

        prop_assert!(replayed.pending_changes().is_empty());
        prop_assert_eq!(visible(&replayed), visible(&merged));
    }
}
