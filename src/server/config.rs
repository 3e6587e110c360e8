//! Configuration loading for breedd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.breedscope/config.toml` (user)
//! 3. `/etc/breedscope/config.toml` (system)
//! 4. built-in defaults (remote provider on `localhost:5000`)

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::DEFAULT_MAX_UPLOAD_BYTES;
use crate::providers::remote::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use crate::providers::{ImageClassifier, RemoteClassifier};
use crate::{BreedscopeError, Result};

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:5001).
    #[serde(default = "default_address")]
    pub address: String,
    /// Largest accepted request body in bytes (default: 10 MiB).
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:5001".to_string()
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

/// Where uploads live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Upload directory (default: static/img).
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Photo shown on the landing page, relative to `upload_dir`.
    #[serde(default = "default_sample_photo")]
    pub sample_photo: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            sample_photo: default_sample_photo(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("static/img")
}

fn default_sample_photo() -> String {
    "dog_picture.jpg".to_string()
}

/// Which classification provider to run.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    Remote(RemoteConfig),
    Local(LocalConfig),
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::Remote(RemoteConfig::default())
    }
}

/// Model server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Model server predict endpoint.
    #[serde(default = "default_remote_url")]
    pub url: String,
    /// Request timeout in seconds (default: 60).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: default_remote_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_remote_url() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// In-process model configuration.
///
/// Either give local paths, or a Hugging Face `repo_id` from which
/// `model_file` and `labels_file` are downloaded. Local paths win.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    #[serde(default)]
    pub labels_path: Option<PathBuf>,
    #[serde(default)]
    pub repo_id: Option<String>,
    #[serde(default = "default_model_file")]
    pub model_file: String,
    #[serde(default = "default_labels_file")]
    pub labels_file: String,
    /// Device to use: "cpu", "cuda" or "cuda:<id>" (default: "cpu").
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default = "default_input_size")]
    pub input_width: u32,
    #[serde(default = "default_input_size")]
    pub input_height: u32,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_softmax")]
    pub softmax: bool,
}

fn default_model_file() -> String {
    "model.onnx".to_string()
}

fn default_labels_file() -> String {
    "labels.txt".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_input_size() -> u32 {
    224
}

fn default_top_k() -> usize {
    5
}

fn default_softmax() -> bool {
    true
}

impl ProviderConfig {
    /// Construct the configured provider.
    ///
    /// Local models are loaded here, once, before the server starts.
    pub fn build(&self) -> Result<Arc<dyn ImageClassifier>> {
        match self {
            Self::Remote(remote) => Ok(Arc::new(RemoteClassifier::with_timeout(
                &remote.url,
                Duration::from_secs(remote.timeout_secs),
            )?)),
            Self::Local(local) => build_local(local),
        }
    }
}

#[cfg(feature = "local-inference")]
fn build_local(local: &LocalConfig) -> Result<Arc<dyn ImageClassifier>> {
    use crate::providers::OnnxImageClassifier;

    Ok(Arc::new(OnnxImageClassifier::new(local.classifier_config()?)?))
}

#[cfg(not(feature = "local-inference"))]
fn build_local(_local: &LocalConfig) -> Result<Arc<dyn ImageClassifier>> {
    Err(BreedscopeError::Configuration(
        "provider kind \"local\" requires the local-inference feature".to_string(),
    ))
}

#[cfg(feature = "local-inference")]
impl LocalConfig {
    /// Resolve sources and settings for the ONNX classifier.
    pub fn classifier_config(&self) -> Result<crate::providers::LocalClassifierConfig> {
        use crate::model::ModelSource;
        use crate::providers::LocalClassifierConfig;

        let source = |path: &Option<PathBuf>, file: &str, what: &str| match (path, &self.repo_id)
        {
            (Some(path), _) => Ok(ModelSource::local(path)),
            (None, Some(repo_id)) => Ok(ModelSource::huggingface(repo_id, file)),
            (None, None) => Err(BreedscopeError::Configuration(format!(
                "local provider needs {what}_path or repo_id"
            ))),
        };

        let mut config = LocalClassifierConfig::new(
            source(&self.model_path, &self.model_file, "model")?,
            source(&self.labels_path, &self.labels_file, "labels")?,
        );
        config.device = self.device.parse()?;
        config.input_width = self.input_width;
        config.input_height = self.input_height;
        config.top_k = self.top_k;
        config.softmax = self.softmax;
        Ok(config)
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Falls back to defaults when no file exists, but an explicit path
    /// that does not exist is an error.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BreedscopeError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            BreedscopeError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(BreedscopeError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".breedscope").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/breedscope/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}
