//! Classification providers.
//!
//! [`RemoteClassifier`] forwards the photo to a separately hosted model
//! server; [`OnnxImageClassifier`] (feature `local-inference`) runs a
//! pretrained network in-process. Both implement [`ImageClassifier`].

#[cfg(feature = "local-inference")]
pub mod onnx_image;
pub mod remote;
pub mod traits;

#[cfg(feature = "local-inference")]
pub use onnx_image::{LocalClassifierConfig, OnnxImageClassifier};
pub use remote::RemoteClassifier;
pub use traits::ImageClassifier;
