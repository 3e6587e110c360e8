//! Client for a separately hosted model server.
//!
//! The server accepts a multipart upload with the image in the `image`
//! field and answers with
//! `{"success": true, "predictions": [{"label": ..., "probability": ...}]}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::traits::ImageClassifier;
use crate::types::{ClassificationResult, Prediction};
use crate::{BreedscopeError, Result};

/// Default model server endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/predict";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for a model server's `/predict` endpoint.
#[derive(Clone)]
pub struct RemoteClassifier {
    http: Client,
    endpoint: String,
}

impl RemoteClassifier {
    /// Create a client for the given endpoint with the default timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    ///
    /// An endpoint given without a scheme (`10.0.0.5/predict`) is treated
    /// as plain HTTP.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                BreedscopeError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            endpoint: normalize_endpoint(&endpoint.into()),
        })
    }

    /// The resolved endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one image to the model server.
    #[instrument(skip(self, image), fields(endpoint = %self.endpoint, bytes = image.len()))]
    pub async fn predict(&self, image: &[u8]) -> Result<ClassificationResult> {
        let part = Part::bytes(image.to_vec()).file_name("upload");
        let form = Form::new().part("image", part);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BreedscopeError::Http(e.to_string()))?;

        Self::handle_response_errors(&response)?;

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| BreedscopeError::DataError(format!("malformed predict response: {e}")))?;

        let result = body.into_result()?;
        debug!(count = result.len(), "model server returned predictions");
        Ok(result)
    }

    /// Map HTTP error statuses to errors.
    fn handle_response_errors(response: &reqwest::Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        match status.as_u16() {
            503 => Err(BreedscopeError::Api {
                status: 503,
                message: "Model server is loading, please retry".to_string(),
            }),
            code => Err(BreedscopeError::Api {
                status: code,
                message: format!("model server error: {status}"),
            }),
        }
    }
}

#[async_trait]
impl ImageClassifier for RemoteClassifier {
    fn name(&self) -> &str {
        "remote"
    }

    async fn classify(&self, image: &[u8]) -> Result<ClassificationResult> {
        self.predict(image).await
    }
}

#[derive(Deserialize)]
struct PredictResponse {
    success: bool,
    #[serde(default)]
    predictions: Option<Vec<Prediction>>,
}

impl PredictResponse {
    fn into_result(self) -> Result<ClassificationResult> {
        if !self.success {
            return Err(BreedscopeError::ProviderUnavailable(
                "model server reported success: false".to_string(),
            ));
        }
        self.predictions
            .map(ClassificationResult::from)
            .ok_or_else(|| BreedscopeError::DataError("predict response has no predictions".into()))
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_http_scheme() {
        assert_eq!(
            normalize_endpoint("35.200.244.216/predict"),
            "http://35.200.244.216/predict"
        );
        assert_eq!(
            normalize_endpoint("https://models.example/predict"),
            "https://models.example/predict"
        );
    }

    #[test]
    fn failure_flag_is_unavailable() {
        let body: PredictResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(matches!(
            body.into_result(),
            Err(BreedscopeError::ProviderUnavailable(_))
        ));
    }

    #[test]
    fn success_without_predictions_is_malformed() {
        let body: PredictResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(matches!(body.into_result(), Err(BreedscopeError::DataError(_))));
    }

    #[test]
    fn success_keeps_provider_order() {
        let body: PredictResponse = serde_json::from_str(
            r#"{"success": true, "predictions": [
                {"label": "A", "probability": 0.2},
                {"label": "B", "probability": 0.7}
            ]}"#,
        )
        .unwrap();
        let result = body.into_result().unwrap();
        assert_eq!(result.as_slice()[0].label, "A");
        assert_eq!(result.top_class(), Some("B"));
    }
}
