//! Random apply sequences against a simple model of the expected key set.

use lint_overlay::{AnnotationEngine, Config, DiagnosticMessage, Range, Severity};
use lint_overlay_headless::HeadlessEditor;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

const PATH: &str = "/random/src/lib.rs";

fn text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("{i:04} fn item_{i}() -> usize {{ {i} }}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn random_message(rng: &mut impl Rng, key: String, lines: usize) -> DiagnosticMessage {
    let line = rng.gen_range(0..lines);
    let start = rng.gen_range(0..10);
    let end_line = (line + rng.gen_range(0..3)).min(lines - 1);
    let severity = match rng.gen_range(0..3) {
        0 => Severity::Error,
        1 => Severity::Warning,
        _ => Severity::Info,
    };
    DiagnosticMessage::new(
        key,
        severity,
        "random",
        PATH,
        Range::new((line, start), (end_line, start + rng.gen_range(0..10))),
    )
}

#[test]
fn test_random_deltas_keep_keys_consistent() {
    let lines = 200;
    let mut rng = rand::thread_rng();
    let mut engine = AnnotationEngine::new(
        HeadlessEditor::new(&text(lines)).with_path(PATH),
        Config::default(),
    );
    let mut model: BTreeMap<String, DiagnosticMessage> = BTreeMap::new();
    let mut next_key = 0usize;

    for round in 0..300 {
        let mut live: Vec<DiagnosticMessage> = model.values().cloned().collect();
        live.shuffle(&mut rng);
        let removed: Vec<DiagnosticMessage> = live
            .into_iter()
            .take(rng.gen_range(0..4))
            .collect();

        let mut added = Vec::new();
        for _ in 0..rng.gen_range(0..5) {
            // Occasionally re-add a key that is being removed in the same delta.
            let key = match removed.first() {
                Some(message) if rng.gen_bool(0.2) => message.key.clone(),
                _ => {
                    next_key += 1;
                    format!("k{next_key:05}")
                }
            };
            if added.iter().any(|m: &DiagnosticMessage| m.key == key) {
                continue;
            }
            added.push(random_message(&mut rng, key, lines));
        }

        engine.apply(&added, &removed);
        for message in &removed {
            model.remove(&message.key);
        }
        for message in &added {
            model.insert(message.key.clone(), message.clone());
        }

        let keys: Vec<&str> = engine.messages().map(|m| m.key.as_str()).collect();
        let expected: Vec<&str> = model.keys().map(String::as_str).collect();
        assert_eq!(keys, expected, "round {round}");
        assert_eq!(engine.host().highlights().len(), model.len(), "round {round}");
        engine.store().check_invariants();
    }

    engine.dispose();
    assert_eq!(engine.host().marker_count(), 0);
    assert!(engine.host().gutter_lanes().is_empty());
}
