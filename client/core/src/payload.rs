//! Image payload encoding for upload requests.
//!
//! The wire value of `image_data` is always bare base64: a `data:` URI
//! header coming from a browser-side reader is stripped before the payload
//! is constructed, and `from_file` never produces one.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::LensError;

/// Upload size cap (10 MiB) applied before encoding.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Base64 text encoding of one user-selected image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePayload(String);

impl ImagePayload {
    /// Read a file and encode its bytes.
    pub async fn from_file(path: &Path) -> Result<Self, LensError> {
        let bytes = fs::read(path)
            .await
            .map_err(|e| LensError::Encoding(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_bytes(&bytes))
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(BASE64.encode(bytes))
    }

    /// Accept a `data:<mime>;base64,<payload>` string and strip the header.
    ///
    /// A string without a recognizable header passes through unchanged, so
    /// already-bare payloads are accepted too.
    pub fn from_data_uri(value: &str) -> Self {
        match value.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
            Some((_, body)) => Self(body.to_string()),
            None => Self(value.to_string()),
        }
    }

    /// Rebuild the full data URI for inline preview rendering.
    pub fn to_data_uri(&self, mime: &str) -> String {
        format!("data:{};base64,{}", mime, self.0)
    }

    pub fn decode(&self) -> Result<Vec<u8>, LensError> {
        BASE64
            .decode(&self.0)
            .map_err(|e| LensError::Encoding(format!("invalid base64 payload: {}", e)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the encoded text, used for logging instead of the payload
    /// itself.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Detect MIME type by file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png"          => "image/png",
        "gif"          => "image/gif",
        "webp"         => "image/webp",
        "bmp"          => "image/bmp",
        "tiff" | "tif" => "image/tiff",
        _              => "application/octet-stream",
    }
}

/// Whether a MIME type is for an image.
pub fn is_image_mime(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Reject a file before it is read into memory.
///
/// Checks run against the extension and the on-disk size, so an oversized
/// file is never base64-expanded.
pub async fn validate_image(path: &Path, max_bytes: u64) -> Result<(), LensError> {
    let mime = mime_for_path(path);
    if !is_image_mime(mime) {
        return Err(LensError::InvalidImage(format!(
            "unsupported file type: {}",
            mime
        )));
    }

    let meta = fs::metadata(path)
        .await
        .map_err(|e| LensError::Encoding(format!("{}: {}", path.display(), e)))?;
    if meta.len() > max_bytes {
        return Err(LensError::InvalidImage(format!(
            "image is {} bytes; limit is {} bytes",
            meta.len(),
            max_bytes
        )));
    }

    Ok(())
}
