//! Classification provider trait.
//!
//! A provider maps raw image bytes to a list of `(label, probability)`
//! pairs. The handler owns ranking and top-class selection, so providers
//! may return predictions in any order.
//!
//! # Failure Semantics
//!
//! Providers never signal failure through a flag in the payload; a remote
//! server that answers `success: false` surfaces as
//! `BreedscopeError::ProviderUnavailable`. Every `Err` is treated by the
//! handler as "unavailable" for that request and is never retried.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::types::ClassificationResult;

/// Provider for image classification.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Provider name for logging and metrics.
    fn name(&self) -> &str;

    /// Classify one encoded image (JPEG, PNG, ...).
    async fn classify(&self, image: &[u8]) -> Result<ClassificationResult>;
}

#[async_trait]
impl<T: ImageClassifier + ?Sized> ImageClassifier for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn classify(&self, image: &[u8]) -> Result<ClassificationResult> {
        (**self).classify(image).await
    }
}
