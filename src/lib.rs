//! Breedscope - upload a dog photo, get its likely breeds.
//!
//! The crate wires an HTTP upload endpoint to an [`ImageClassifier`] and
//! renders the ranked probabilities with a bar chart. The classifier is
//! either a separately hosted model server ([`RemoteClassifier`]) or, with
//! the `local-inference` feature, an ONNX network loaded in-process.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use breedscope::server::{AppState, router};
//! use breedscope::{PageRenderer, PredictionHandler, RemoteClassifier, UploadStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let classifier = Arc::new(RemoteClassifier::new("http://localhost:5000/predict")?);
//!     let handler = PredictionHandler::new(
//!         UploadStore::new("static/img"),
//!         classifier,
//!         "dog_picture.jpg",
//!     );
//!     let app = router(AppState::new(handler, PageRenderer::new()?));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5001").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod chart;
pub mod error;
pub mod handler;
#[cfg(feature = "local-inference")]
pub mod model;
pub mod providers;
pub mod server;
pub mod storage;
pub mod telemetry;
pub mod types;
mod version;
pub mod view;

// Re-export main types at crate root
pub use error::{BreedscopeError, Result};
pub use handler::PredictionHandler;
pub use providers::{ImageClassifier, RemoteClassifier};
pub use storage::{Upload, UploadStore};
pub use version::{PKG_VERSION, version_string};
pub use view::{PageRenderer, PageView};

#[cfg(feature = "local-inference")]
pub use model::{Device, ModelSource};
#[cfg(feature = "local-inference")]
pub use providers::{LocalClassifierConfig, OnnxImageClassifier};

pub use types::{
    ClassificationResult, Prediction, PredictionOutcome, PredictionReport, ReportSummary,
};
