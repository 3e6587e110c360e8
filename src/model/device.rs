//! Compute device for the in-process classifier.

use std::str::FromStr;

use crate::BreedscopeError;

/// Where ONNX Runtime executes the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    Cpu,

    #[cfg(feature = "cuda")]
    Cuda {
        /// GPU device ID (0-indexed).
        device_id: u32,
    },
}

impl Device {
    pub fn cpu() -> Self {
        Self::Cpu
    }

    #[cfg(feature = "cuda")]
    pub fn cuda(device_id: u32) -> Self {
        Self::Cuda { device_id }
    }

    /// Device name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            #[cfg(feature = "cuda")]
            Self::Cuda { .. } => "CUDA",
        }
    }
}

/// Parses the config spelling: `cpu`, `cuda` or `cuda:<id>`.
impl FromStr for Device {
    type Err = BreedscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            #[cfg(feature = "cuda")]
            "cuda" => Ok(Self::Cuda { device_id: 0 }),
            #[cfg(feature = "cuda")]
            other if other.starts_with("cuda:") => other[5..]
                .parse()
                .map(|device_id| Self::Cuda { device_id })
                .map_err(|_| BreedscopeError::Configuration(format!("invalid device: {s}"))),
            _ => Err(BreedscopeError::Configuration(format!(
                "unsupported device: {s}"
            ))),
        }
    }
}
