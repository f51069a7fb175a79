//! Upload limits and moderation vocabulary for images.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum accepted upload size (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Formats accepted for upload, as detected from the bytes.
pub const ALLOWED_FORMATS: &[&str] = &["png", "jpeg", "gif", "webp"];

/// Moderation status. New uploads start as `PENDING`; moderation itself
/// happens elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageStatus {
    Pending,
    Approved,
    Flagged,
}

impl ImageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageStatus::Pending => "PENDING",
            ImageStatus::Approved => "APPROVED",
            ImageStatus::Flagged => "FLAGGED",
        }
    }
}

pub fn validate_upload_size(len: usize) -> Result<(), CoreError> {
    if len == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".into()));
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "File too large: {len} bytes (max {MAX_UPLOAD_BYTES})"
        )));
    }
    Ok(())
}

pub fn validate_format(format: &str) -> Result<(), CoreError> {
    if ALLOWED_FORMATS.contains(&format) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported image format '{format}'. Must be one of: {}",
            ALLOWED_FORMATS.join(", ")
        )))
    }
}

/// File extension used for the stored object.
pub fn extension_for(format: &str) -> &'static str {
    match format {
        "jpeg" => "jpg",
        "gif" => "gif",
        "webp" => "webp",
        _ => "png",
    }
}
