//! Upload storage.
//!
//! Uploaded photos are written under a single root directory. Names are
//! sanitised before use, only image extensions are accepted, and an
//! existing file is never overwritten: `dog.jpg` becomes `dog_1.jpg`,
//! then `dog_2.jpg`, and so on.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, warn};
use unicode_normalization::UnicodeNormalization;

use crate::{BreedscopeError, Result};

/// Extensions accepted as images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpe", "jpeg", "png", "gif", "svg", "bmp", "webp"];

/// A file taken from the `photo` multipart field.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-supplied file name; untrusted.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Directory holding uploaded photos and the sample photo.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist an upload and return the name it was stored under.
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name, bytes = upload.bytes.len()))]
    pub async fn save(&self, upload: &Upload) -> Result<String> {
        let (stem, ext) = allowed_name(&upload.file_name)?;
        if upload.bytes.is_empty() {
            return Err(BreedscopeError::InvalidInput(format!(
                "uploaded file {} is empty",
                upload.file_name
            )));
        }

        tokio::fs::create_dir_all(&self.root).await?;

        let mut candidate = format!("{stem}.{ext}");
        let mut count = 0u32;
        loop {
            let path = self.root.join(&candidate);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => {
                    fill_or_remove(file, &path, &upload.bytes).await?;
                    debug!(stored_as = %candidate, "saved upload");
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    count += 1;
                    candidate = format!("{stem}_{count}.{ext}");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read a stored file back.
    ///
    /// Only names that survive sanitising unchanged are accepted, so a
    /// caller cannot reach outside the root.
    pub async fn read(&self, file_name: &str) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.path_of(file_name)?).await?)
    }

    /// Full path for a stored name.
    pub fn path_of(&self, file_name: &str) -> Result<PathBuf> {
        if file_name.is_empty() || secure_filename(file_name) != file_name {
            return Err(BreedscopeError::InvalidInput(format!(
                "invalid stored file name: {file_name:?}"
            )));
        }
        Ok(self.root.join(file_name))
    }
}

/// Write a freshly created file, removing it again if the write fails so
/// no truncated upload keeps the reserved name.
async fn fill_or_remove<W>(mut file: W, path: &Path, bytes: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = match file.write_all(bytes).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };
    if written.is_err() {
        drop(file);
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!(path = %path.display(), error = %e, "failed to remove partial upload");
        }
    }
    written
}

/// Reduce a client-supplied name to `[A-Za-z0-9_.-]`.
///
/// Accents are folded away (NFKD, `hünd` becomes `hund`), other non-ASCII
/// characters are dropped, path separators and whitespace runs
/// become `_`, and leading/trailing dots and underscores are stripped.
/// The result may be empty.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Sanitise and split a name into stem and lowercased extension.
fn allowed_name(name: &str) -> Result<(String, String)> {
    let secure = secure_filename(name);
    let (stem, ext) = secure
        .rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
        .ok_or_else(|| BreedscopeError::UnsupportedImage(format!("{name:?} has no extension")))?;

    let ext = ext.to_ascii_lowercase();
    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(BreedscopeError::UnsupportedImage(format!(
            "extension .{ext} is not an image type"
        )));
    }
    Ok((stem.to_string(), ext))
}
