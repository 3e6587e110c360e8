//! PredictionHandler with mock providers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use breedscope::{
    BreedscopeError, ClassificationResult, ImageClassifier, Prediction, PredictionHandler,
    PredictionOutcome, Result, Upload, UploadStore,
};
use tempfile::TempDir;

// ============================================================================
// Mock providers
// ============================================================================

struct CountingClassifier {
    calls: AtomicUsize,
    predictions: Vec<Prediction>,
}

impl CountingClassifier {
    fn new(predictions: Vec<Prediction>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            predictions,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageClassifier for CountingClassifier {
    fn name(&self) -> &str {
        "counting"
    }

    async fn classify(&self, _image: &[u8]) -> Result<ClassificationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.predictions.clone().into())
    }
}

struct UnavailableClassifier;

#[async_trait]
impl ImageClassifier for UnavailableClassifier {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn classify(&self, _image: &[u8]) -> Result<ClassificationResult> {
        Err(BreedscopeError::ProviderUnavailable("success: false".into()))
    }
}

/// Records the bytes it was asked to classify.
struct EchoClassifier {
    seen: std::sync::Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl ImageClassifier for EchoClassifier {
    fn name(&self) -> &str {
        "echo"
    }

    async fn classify(&self, image: &[u8]) -> Result<ClassificationResult> {
        self.seen.lock().unwrap().push(image.to_vec());
        Ok(vec![Prediction::new("echo", 1.0)].into())
    }
}

fn abc() -> Vec<Prediction> {
    vec![
        Prediction::new("A", 0.2),
        Prediction::new("B", 0.7),
        Prediction::new("C", 0.1),
    ]
}

fn handler(classifier: Arc<dyn ImageClassifier>) -> (TempDir, PredictionHandler) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("dog_picture.jpg"), b"sample").unwrap();
    let handler = PredictionHandler::new(UploadStore::new(dir.path()), classifier, "dog_picture.jpg");
    (dir, handler)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn upload_is_stored_classified_and_ranked() {
    let classifier = CountingClassifier::new(abc());
    let (dir, handler) = handler(classifier.clone());

    let report = handler
        .handle_upload(Some(Upload::new("rex.jpg", b"rex".to_vec())))
        .await
        .unwrap();

    assert_eq!(report.photo_name, "rex.jpg");
    assert!(dir.path().join("rex.jpg").exists());
    assert_eq!(report.top_class(), Some("B"));
    let order: Vec<&str> = report.predictions().iter().map(|p| p.label.as_str()).collect();
    assert_eq!(order, vec!["B", "A", "C"]);
    assert_eq!(classifier.calls(), 1);
}

#[tokio::test]
async fn provider_receives_stored_bytes() {
    let classifier = Arc::new(EchoClassifier {
        seen: std::sync::Mutex::new(Vec::new()),
    });
    let (_dir, handler) = handler(classifier.clone());

    handler
        .handle_upload(Some(Upload::new("rex.png", b"\x89PNG rex".to_vec())))
        .await
        .unwrap();

    assert_eq!(*classifier.seen.lock().unwrap(), vec![b"\x89PNG rex".to_vec()]);
}

#[tokio::test]
async fn missing_upload_is_rejected_without_provider_call() {
    let classifier = CountingClassifier::new(abc());
    let (_dir, handler) = handler(classifier.clone());

    let err = handler.handle_upload(None).await.unwrap_err();

    assert!(matches!(err, BreedscopeError::MissingUpload));
    assert_eq!(err.user_message(), "Please upload image of your dog");
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn invalid_upload_is_rejected_without_provider_call() {
    let classifier = CountingClassifier::new(abc());
    let (_dir, handler) = handler(classifier.clone());

    let err = handler
        .handle_upload(Some(Upload::new("rex.gifv", b"x".to_vec())))
        .await
        .unwrap_err();

    assert!(err.is_user_error());
    assert_eq!(err.user_message(), "Please upload jpeg image of your dog");
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn provider_failure_is_unavailable() {
    let (_dir, handler) = handler(Arc::new(UnavailableClassifier));

    let report = handler
        .handle_upload(Some(Upload::new("rex.jpg", b"rex".to_vec())))
        .await
        .unwrap();

    assert_eq!(report.outcome, PredictionOutcome::Unavailable);
    assert!(report.predictions().is_empty());
    assert_eq!(report.top_class(), None);
}

#[tokio::test]
async fn empty_predictions_have_no_top_class() {
    let (_dir, handler) = handler(CountingClassifier::new(Vec::new()));

    let report = handler
        .handle_upload(Some(Upload::new("rex.jpg", b"rex".to_vec())))
        .await
        .unwrap();

    assert!(report.outcome.is_available());
    assert_eq!(report.top_class(), None);
}

#[tokio::test]
async fn default_report_uses_sample_photo() {
    let classifier = CountingClassifier::new(abc());
    let (_dir, handler) = handler(classifier.clone());

    let report = handler.default_report().await;

    assert_eq!(report.photo_name, "dog_picture.jpg");
    assert_eq!(report.top_class(), Some("B"));
    assert_eq!(classifier.calls(), 1);
}

#[tokio::test]
async fn missing_sample_photo_is_unavailable() {
    let classifier = CountingClassifier::new(abc());
    let dir = tempfile::tempdir().unwrap();
    let handler = PredictionHandler::new(UploadStore::new(dir.path()), classifier.clone(), "absent.jpg");

    let outcome = handler.default_report().await.outcome;

    assert_eq!(outcome, PredictionOutcome::Unavailable);
    assert_eq!(classifier.calls(), 0);
}
