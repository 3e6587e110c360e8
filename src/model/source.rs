//! Where the classifier's model and label files come from.

use crate::error::{BreedscopeError, Result};
use std::path::PathBuf;

/// Source for a model or label file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// A file inside a Hugging Face Hub repository.
    HuggingFace {
        /// Repository ID (e.g., "onnxmodelzoo/resnet50-v2-7").
        repo_id: String,
        /// File within the repo.
        file: String,
    },

    /// A file on local disk.
    Local { path: PathBuf },
}

impl ModelSource {
    pub fn huggingface(repo_id: impl Into<String>, file: impl Into<String>) -> Self {
        Self::HuggingFace {
            repo_id: repo_id.into(),
            file: file.into(),
        }
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local { path: path.into() }
    }

    /// Display name, used in logs and as the provider name suffix.
    pub fn name(&self) -> String {
        match self {
            Self::HuggingFace { repo_id, .. } => repo_id.clone(),
            Self::Local { path } => path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("custom")
                .to_string(),
        }
    }

    /// Resolve to a local path, downloading into the hub cache if needed.
    pub fn resolve(&self) -> Result<PathBuf> {
        match self {
            Self::HuggingFace { repo_id, file } => {
                let api = hf_hub::api::sync::Api::new().map_err(|e| {
                    BreedscopeError::Configuration(format!("Failed to initialize HF API: {e}"))
                })?;

                api.model(repo_id.clone()).get(file).map_err(|e| {
                    BreedscopeError::Configuration(format!(
                        "Failed to download {file} from {repo_id}: {e}"
                    ))
                })
            }
            Self::Local { path } => {
                if !path.exists() {
                    return Err(BreedscopeError::Configuration(format!(
                        "Local model path does not exist: {}",
                        path.display()
                    )));
                }
                Ok(path.clone())
            }
        }
    }
}
