//! Base trait for generative model providers

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Image error: {0}")]
    ImageError(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Image bytes ready for transport: base64 content plus MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Standard base64 encoding of the raw bytes
    pub data: String,
}

impl InlineImage {
    /// Encode raw bytes for inline transport
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        use base64::Engine;

        Self {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// Response from a generative provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateResponse {
    pub text: String,
    pub finish_reason: Option<String>,
}

/// Trait for generative model providers.
///
/// Any transport, quota or parse problem is reported as an error; callers do
/// not distinguish between them.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Generate a reply to a single prompt, optionally with one image
    async fn generate(
        &self,
        prompt: &str,
        image: Option<InlineImage>,
    ) -> ProviderResult<GenerateResponse>;

    /// Model used for requests
    fn model(&self) -> String;
}
