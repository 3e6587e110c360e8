//! Classification output as returned by a provider.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A single `(label, probability)` pair.
///
/// Field names match the model server's JSON wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// Probability in `[0, 1]`.
    pub probability: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, probability: f32) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Predictions for one image, in whatever order the provider produced them.
///
/// Call [`ranked`](Self::ranked) before presenting anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationResult {
    predictions: Vec<Prediction>,
}

impl ClassificationResult {
    pub fn new(predictions: Vec<Prediction>) -> Self {
        Self { predictions }
    }

    /// Sort descending by probability.
    ///
    /// The sort is stable, so equal probabilities keep the provider's order.
    /// NaN probabilities rank after every real value.
    pub fn ranked(mut self) -> Self {
        self.predictions
            .sort_by(|a, b| rank_key(b.probability).total_cmp(&rank_key(a.probability)));
        self
    }

    /// Label with the highest probability; the first one on ties.
    ///
    /// Works on unranked results too. `None` for an empty result.
    pub fn top_class(&self) -> Option<&str> {
        self.predictions
            .iter()
            .reduce(|best, p| {
                match rank_key(p.probability).total_cmp(&rank_key(best.probability)) {
                    Ordering::Greater => p,
                    _ => best,
                }
            })
            .map(|p| p.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Prediction> {
        self.predictions.iter()
    }

    pub fn as_slice(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn into_vec(self) -> Vec<Prediction> {
        self.predictions
    }
}

impl From<Vec<Prediction>> for ClassificationResult {
    fn from(predictions: Vec<Prediction>) -> Self {
        Self::new(predictions)
    }
}

impl FromIterator<Prediction> for ClassificationResult {
    fn from_iter<I: IntoIterator<Item = Prediction>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ClassificationResult {
    type Item = &'a Prediction;
    type IntoIter = std::slice::Iter<'a, Prediction>;

    fn into_iter(self) -> Self::IntoIter {
        self.predictions.iter()
    }
}

fn rank_key(probability: f32) -> f32 {
    if probability.is_nan() {
        f32::NEG_INFINITY
    } else {
        probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(result: &ClassificationResult) -> Vec<&str> {
        result.iter().map(|p| p.label.as_str()).collect()
    }

    #[test]
    fn ranked_sorts_descending() {
        let result = ClassificationResult::from(vec![
            Prediction::new("A", 0.2),
            Prediction::new("B", 0.7),
            Prediction::new("C", 0.1),
        ])
        .ranked();

        assert_eq!(labels(&result), vec!["B", "A", "C"]);
        assert_eq!(result.top_class(), Some("B"));
    }

    #[test]
    fn ties_keep_provider_order() {
        let result = ClassificationResult::from(vec![
            Prediction::new("first", 0.4),
            Prediction::new("low", 0.2),
            Prediction::new("second", 0.4),
        ]);

        assert_eq!(result.top_class(), Some("first"));
        assert_eq!(labels(&result.ranked()), vec!["first", "second", "low"]);
    }

    #[test]
    fn empty_result_has_no_top_class() {
        let result = ClassificationResult::default().ranked();
        assert!(result.is_empty());
        assert_eq!(result.top_class(), None);
    }

    #[test]
    fn nan_ranks_last() {
        let result = ClassificationResult::from(vec![
            Prediction::new("broken", f32::NAN),
            Prediction::new("real", 0.05),
        ]);

        assert_eq!(result.top_class(), Some("real"));
        assert_eq!(labels(&result.ranked()), vec!["real", "broken"]);
    }

    #[test]
    fn deserializes_wire_format() {
        let json = r#"[{"label": "beagle", "probability": 0.91}]"#;
        let result: ClassificationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.as_slice()[0], Prediction::new("beagle", 0.91));
    }
}
