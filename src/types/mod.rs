//! Public types for the Breedscope API.

mod outcome;
mod prediction;

pub use outcome::{PredictionOutcome, PredictionReport, ReportSummary};
pub use prediction::{ClassificationResult, Prediction};
