//! What the request handler hands to the presentation layer.

use serde::Serialize;

use super::prediction::{ClassificationResult, Prediction};
use crate::error::INVALID_UPLOAD_MESSAGE;

/// Result of asking a provider about one stored photo.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    /// Provider succeeded; predictions are already ranked.
    Ranked(ClassificationResult),
    /// Provider failed or reported `success: false`.
    Unavailable,
}

impl PredictionOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Ranked(_))
    }

    pub fn predictions(&self) -> &[Prediction] {
        match self {
            Self::Ranked(result) => result.as_slice(),
            Self::Unavailable => &[],
        }
    }

    pub fn top_class(&self) -> Option<&str> {
        match self {
            Self::Ranked(result) => result.top_class(),
            Self::Unavailable => None,
        }
    }
}

/// Stored photo plus what the classifier made of it.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionReport {
    /// File name under the upload directory.
    pub photo_name: String,
    pub outcome: PredictionOutcome,
}

impl PredictionReport {
    pub fn new(photo_name: impl Into<String>, outcome: PredictionOutcome) -> Self {
        Self {
            photo_name: photo_name.into(),
            outcome,
        }
    }

    pub fn predictions(&self) -> &[Prediction] {
        self.outcome.predictions()
    }

    pub fn top_class(&self) -> Option<&str> {
        self.outcome.top_class()
    }

    /// Message for the uploader when no prediction could be made.
    pub fn user_message(&self) -> Option<&'static str> {
        match self.outcome {
            PredictionOutcome::Ranked(_) => None,
            PredictionOutcome::Unavailable => Some(INVALID_UPLOAD_MESSAGE),
        }
    }
}

/// JSON shape of a report, returned by `POST /api/predict`.
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub photo_name: &'a str,
    pub available: bool,
    pub top_class: Option<&'a str>,
    pub predictions: &'a [Prediction],
    /// Set when the provider was unavailable.
    pub error: Option<&'static str>,
}

impl<'a> From<&'a PredictionReport> for ReportSummary<'a> {
    fn from(report: &'a PredictionReport) -> Self {
        Self {
            photo_name: &report.photo_name,
            available: report.outcome.is_available(),
            top_class: report.top_class(),
            predictions: report.predictions(),
            error: report.user_message(),
        }
    }
}
