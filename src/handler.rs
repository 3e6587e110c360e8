//! Prediction request handling.
//!
//! The handler is the only place that talks to a classification provider.
//! It stores the upload, classifies the stored file, ranks the result and
//! turns every provider failure into [`PredictionOutcome::Unavailable`].
//!
//! ```text
//!   Upload ──► UploadStore::save ──► stored name
//!                                        │
//!                                        ▼
//!                        UploadStore::read ──► ImageClassifier::classify
//!                                                      │
//!                                   Ok ──► ranked ─────┤
//!                                   Err ─► warn! ──────┴──► PredictionReport
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::providers::ImageClassifier;
use crate::storage::{Upload, UploadStore};
use crate::telemetry;
use crate::types::{PredictionOutcome, PredictionReport};
use crate::{BreedscopeError, Result};

/// Handles `GET /` and `POST /predict` independent of the HTTP layer.
pub struct PredictionHandler {
    store: UploadStore,
    classifier: Arc<dyn ImageClassifier>,
    sample_photo: String,
}

impl PredictionHandler {
    pub fn new(
        store: UploadStore,
        classifier: Arc<dyn ImageClassifier>,
        sample_photo: impl Into<String>,
    ) -> Self {
        Self {
            store,
            classifier,
            sample_photo: sample_photo.into(),
        }
    }

    pub fn store(&self) -> &UploadStore {
        &self.store
    }

    pub fn sample_photo(&self) -> &str {
        &self.sample_photo
    }

    pub fn provider_name(&self) -> &str {
        self.classifier.name()
    }

    /// Classify the sample photo for the landing page.
    pub async fn default_report(&self) -> PredictionReport {
        let outcome = self.predict_stored(&self.sample_photo).await;
        PredictionReport::new(self.sample_photo.clone(), outcome)
    }

    /// Store an upload and classify it.
    ///
    /// `None` means the request had no `photo` field; it is rejected
    /// before storage or the provider are touched. Storage failures are
    /// returned as errors. Provider failures are not: they yield an
    /// `Unavailable` report.
    #[instrument(skip_all, fields(provider = self.classifier.name()))]
    pub async fn handle_upload(&self, upload: Option<Upload>) -> Result<PredictionReport> {
        let Some(upload) = upload else {
            return Err(Self::reject(BreedscopeError::MissingUpload));
        };

        let photo_name = self.store.save(&upload).await.map_err(Self::reject)?;
        info!(photo_name = %photo_name, "stored upload");

        let outcome = self.predict_stored(&photo_name).await;
        Ok(PredictionReport::new(photo_name, outcome))
    }

    /// Classify a file already under the upload directory.
    #[instrument(skip(self), fields(provider = self.classifier.name()))]
    pub async fn predict_stored(&self, photo_name: &str) -> PredictionOutcome {
        let bytes = match self.store.read(photo_name).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(photo_name, error = %e, "stored photo unreadable");
                return PredictionOutcome::Unavailable;
            }
        };

        let start = Instant::now();
        let result = self.classifier.classify(&bytes).await;
        self.record_prediction(start, result.is_ok());

        match result {
            Ok(result) => PredictionOutcome::Ranked(result.ranked()),
            Err(e) => {
                warn!(photo_name, error = %e, "classification unavailable");
                PredictionOutcome::Unavailable
            }
        }
    }

    fn reject(err: BreedscopeError) -> BreedscopeError {
        metrics::counter!(telemetry::UPLOADS_REJECTED_TOTAL, "reason" => err.reason()).increment(1);
        warn!(error = %err, "upload rejected");
        err
    }

    fn record_prediction(&self, start: Instant, ok: bool) {
        let status = if ok { "ok" } else { "unavailable" };
        let provider = self.classifier.name().to_owned();
        metrics::counter!(telemetry::PREDICTIONS_TOTAL,
            "provider" => provider.clone(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::PREDICTION_DURATION_SECONDS,
            "provider" => provider,
        )
        .record(start.elapsed().as_secs_f64());
    }
}
