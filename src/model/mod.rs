//! Model loading infrastructure for local inference.

pub mod device;
pub mod source;

pub use device::Device;
pub use source::ModelSource;
