//! Breedscope error types

/// Message shown when the request carried no `photo` field.
pub const MISSING_UPLOAD_MESSAGE: &str = "Please upload image of your dog";

/// Message shown for every other rejected or failed upload.
pub const INVALID_UPLOAD_MESSAGE: &str = "Please upload jpeg image of your dog";

/// Breedscope error types
#[derive(Debug, thiserror::Error)]
pub enum BreedscopeError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The model server answered but reported `success: false`.
    #[error("classification provider unavailable: {0}")]
    ProviderUnavailable(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data error: {0}")]
    DataError(String),

    #[error("empty response from model")]
    EmptyResponse,

    // Upload errors
    #[error("no photo uploaded")]
    MissingUpload,

    #[error("unsupported image file: {0}")]
    UnsupportedImage(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("multipart error: {0}")]
    Multipart(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Presentation errors
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl BreedscopeError {
    /// Whether the error was caused by what the client sent.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::MissingUpload
                | Self::UnsupportedImage(_)
                | Self::InvalidInput(_)
                | Self::Multipart(_)
        )
    }

    /// Message safe to render back to the person who uploaded the photo.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingUpload => MISSING_UPLOAD_MESSAGE,
            _ => INVALID_UPLOAD_MESSAGE,
        }
    }

    /// Short label for the `reason` metric dimension.
    pub(crate) fn reason(&self) -> &'static str {
        match self {
            Self::MissingUpload => "missing",
            Self::UnsupportedImage(_) => "unsupported",
            Self::InvalidInput(_) => "invalid",
            Self::Multipart(_) => "multipart",
            Self::Io(_) => "io",
            _ => "other",
        }
    }
}

/// Result type alias for Breedscope operations
pub type Result<T> = std::result::Result<T, BreedscopeError>;
