//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Common labels
//!
//! - `provider`: classifier name (e.g. "remote", "onnx:resnet50")
//! - `status`: "ok" or "unavailable"
//! - `reason`: why an upload was rejected ("missing", "unsupported", ...)

/// Total provider calls; a stored photo that cannot be read is not counted.
///
/// Labels: `provider`, `status` ("ok" | "unavailable").
pub const PREDICTIONS_TOTAL: &str = "breedscope_predictions_total";

/// Provider call duration in seconds.
///
/// Labels: `provider`.
pub const PREDICTION_DURATION_SECONDS: &str = "breedscope_prediction_duration_seconds";

/// Uploads rejected before reaching the provider.
///
/// Labels: `reason`.
pub const UPLOADS_REJECTED_TOTAL: &str = "breedscope_uploads_rejected_total";
