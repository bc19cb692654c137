//! Image attachments picked by the user

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::base::{InlineImage, ProviderError, ProviderResult};

/// An image chosen for the next message.
///
/// Only the path is read, and only at send time; `preview` is what the
/// transcript shows for the attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub path: PathBuf,
    pub preview: String,
}

impl ImageAttachment {
    /// Attachment whose preview is the file path itself
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let preview = path.display().to_string();
        Self { path, preview }
    }

    /// MIME type guessed from the file extension
    pub fn mime_type(&self) -> ProviderResult<String> {
        let mime = mime_guess::from_path(&self.path).first().ok_or_else(|| {
            ProviderError::ImageError(format!(
                "cannot determine type of {}",
                self.path.display()
            ))
        })?;

        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(ProviderError::ImageError(format!(
                "{} is not an image ({})",
                self.path.display(),
                mime
            )));
        }
        Ok(mime.essence_str().to_string())
    }

    /// Read the file and encode it for inline transport
    pub async fn to_inline(&self) -> ProviderResult<InlineImage> {
        let mime_type = self.mime_type()?;
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            ProviderError::ImageError(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        debug!(
            "Encoded image {} ({} bytes, {})",
            self.path.display(),
            bytes.len(),
            mime_type
        );
        Ok(InlineImage::from_bytes(&bytes, mime_type))
    }
}
