//! Ranking and top-class selection.

use breedscope::{ClassificationResult, Prediction, PredictionOutcome, PredictionReport};

fn result(pairs: &[(&str, f32)]) -> ClassificationResult {
    pairs
        .iter()
        .map(|(label, p)| Prediction::new(*label, *p))
        .collect()
}

#[test]
fn top_class_is_highest_probability() {
    let predictions = result(&[("A", 0.2), ("B", 0.7), ("C", 0.1)]);
    assert_eq!(predictions.top_class(), Some("B"));

    let ranked = predictions.ranked();
    let order: Vec<(&str, f32)> = ranked
        .iter()
        .map(|p| (p.label.as_str(), p.probability))
        .collect();
    assert_eq!(order, vec![("B", 0.7), ("A", 0.2), ("C", 0.1)]);
}

#[test]
fn top_class_matches_ranked_head() {
    let cases = [
        result(&[("x", 0.5)]),
        result(&[("x", 0.1), ("y", 0.1), ("z", 0.8)]),
        result(&[("x", 0.3), ("y", 0.3)]),
        result(&[("x", 0.0), ("y", 0.0), ("z", 0.0)]),
    ];

    for case in cases {
        let top = case.top_class().map(str::to_string);
        let ranked = case.ranked();
        assert_eq!(top.as_deref(), ranked.iter().next().map(|p| p.label.as_str()));
    }
}

#[test]
fn ties_resolve_to_first_occurrence() {
    let predictions = result(&[("low", 0.1), ("first", 0.45), ("second", 0.45)]);
    assert_eq!(predictions.top_class(), Some("first"));
    assert_eq!(predictions.ranked().top_class(), Some("first"));
}

#[test]
fn empty_result_has_no_top_class() {
    let empty = ClassificationResult::default();
    assert_eq!(empty.top_class(), None);
    assert_eq!(empty.ranked().top_class(), None);
}

#[test]
fn duplicate_labels_are_kept() {
    let ranked = result(&[("pug", 0.3), ("pug", 0.6)]).ranked();
    assert_eq!(ranked.len(), 2);
    assert!((ranked.as_slice()[0].probability - 0.6).abs() < f32::EPSILON);
}

#[test]
fn report_exposes_ranked_outcome() {
    let ranked = result(&[("A", 0.2), ("B", 0.7)]).ranked();
    let report = PredictionReport::new("dog.jpg", PredictionOutcome::Ranked(ranked));
    assert_eq!(report.top_class(), Some("B"));
    assert_eq!(report.predictions()[0].label, "B");
}
