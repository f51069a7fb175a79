//! Object storage for uploaded images.
//!
//! The [`ObjectStore`] trait is the seam between the upload handler and
//! wherever bytes end up. [`LocalObjectStore`] writes to a directory that
//! the router serves statically.

use std::io::Cursor;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use coauthor_core::error::CoreError;
use coauthor_core::images::{extension_for, validate_format, validate_upload_size};
use image::ImageReader;

/// Metadata about an object after it was written.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Store-relative key, e.g. `2026/10/<uuid>.png`.
    pub key: String,
    /// URL clients fetch the object from.
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
    /// Lowercase format name (`png`, `jpeg`, `gif`, `webp`).
    pub format: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The payload is not an acceptable image.
    #[error("{0}")]
    Rejected(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Rejected(msg) => CoreError::Validation(msg),
            StorageError::Io(e) => CoreError::Internal(e.to_string()),
        }
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Validate and persist an image payload.
    async fn put(&self, data: &[u8]) -> Result<StoredObject, StorageError>;
}

/// Inspect an image payload: size limit, format sniffing and dimensions.
///
/// The declared content type of the upload is ignored; only the bytes count.
pub fn inspect_image(data: &[u8]) -> Result<(&'static str, u32, u32), StorageError> {
    validate_upload_size(data.len()).map_err(|e| StorageError::Rejected(message_of(e)))?;

    let guessed = image::guess_format(data)
        .map_err(|_| StorageError::Rejected("Unrecognized image format".into()))?;
    let format = format_name(guessed)
        .ok_or_else(|| StorageError::Rejected("Unsupported image format".into()))?;
    validate_format(format).map_err(|e| StorageError::Rejected(message_of(e)))?;

    let (width, height) = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(StorageError::Io)?
        .into_dimensions()
        .map_err(|e| StorageError::Rejected(format!("Corrupt image: {e}")))?;

    Ok((format, width, height))
}

fn format_name(format: image::ImageFormat) -> Option<&'static str> {
    match format {
        image::ImageFormat::Png => Some("png"),
        image::ImageFormat::Jpeg => Some("jpeg"),
        image::ImageFormat::Gif => Some("gif"),
        image::ImageFormat::WebP => Some("webp"),
        _ => None,
    }
}

fn message_of(err: CoreError) -> String {
    match err {
        CoreError::Validation(msg) => msg,
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Local filesystem store
// ---------------------------------------------------------------------------

/// Writes objects under `root/{yyyy}/{mm}/{uuid}.{ext}`.
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, data: &[u8]) -> Result<StoredObject, StorageError> {
        let (format, width, height) = inspect_image(data)?;

        let now = Utc::now();
        let dir = format!("{:04}/{:02}", now.year(), now.month());
        let key = format!("{dir}/{}.{}", uuid::Uuid::new_v4(), extension_for(format));

        tokio::fs::create_dir_all(self.root.join(&dir)).await?;
        tokio::fs::write(self.root.join(&key), data).await?;

        tracing::debug!(key = %key, bytes = data.len(), "Stored object");

        Ok(StoredObject {
            url: format!("{}/{key}", self.public_base_url),
            key,
            width,
            height,
            bytes: data.len(),
            format,
        })
    }
}
