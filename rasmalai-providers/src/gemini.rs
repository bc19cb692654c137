//! Gemini `generateContent` HTTP client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use rasmalai_core::config::ProviderConfig;

use crate::base::{GenerateResponse, GenerativeProvider, InlineImage, ProviderError, ProviderResult};

/// Gemini API request format
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<u16>,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Gemini provider client
pub struct GeminiClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(api_key: Option<String>, api_base: Option<String>, model: String) -> Self {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        let api_base = api_base
            .filter(|base| !base.trim().is_empty())
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string());

        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature: 1.0,
            max_output_tokens: 8192,
        }
    }

    /// Build a client from the provider section of the configuration
    pub fn from_config(config: &ProviderConfig) -> Self {
        let mut client = Self::new(
            Some(config.api_key.clone()),
            Some(config.api_base.clone()),
            config.model.clone(),
        );
        client.temperature = config.temperature;
        client.max_output_tokens = config.max_output_tokens;

        if let Some(secs) = config.timeout_secs {
            client.client = Client::builder()
                .timeout(Duration::from_secs(secs))
                .build()
                .unwrap_or_else(|e| {
                    warn!("Failed to build HTTP client with timeout: {}", e);
                    Client::new()
                });
        }
        client
    }

    /// Use a different model for subsequent requests
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model)
    }

    fn build_request(&self, prompt: &str, image: Option<InlineImage>) -> GenerateContentRequest {
        let mut parts = Vec::new();
        if !prompt.is_empty() {
            parts.push(Part {
                text: Some(prompt.to_string()),
                inline_data: None,
            });
        }
        if let Some(image) = image {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: image.mime_type,
                    data: image.data,
                }),
            });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    /// Parse a Gemini response into our standard format
    fn parse_response(response: GenerateContentResponse) -> ProviderResult<GenerateResponse> {
        if let Some(error) = response.error {
            return Err(ProviderError::ApiError(match error.code {
                Some(code) => format!("{}: {}", code, error.message),
                None => error.message,
            }));
        }

        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(ProviderError::InvalidResponse(format!(
                "No candidates in response ({})",
                reason
            )));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(ProviderError::InvalidResponse(format!(
                "Candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(GenerateResponse {
            text,
            finish_reason: candidate.finish_reason,
        })
    }
}

#[async_trait]
impl GenerativeProvider for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        image: Option<InlineImage>,
    ) -> ProviderResult<GenerateResponse> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            ProviderError::ConfigError(
                "Gemini API key not set (GEMINI_API_KEY or provider.api_key)".to_string(),
            )
        })?;

        let has_image = image.is_some();
        let request = self.build_request(prompt, image);
        let url = self.endpoint();
        debug!(
            "Sending generateContent request for model {} (image: {})",
            self.model, has_image
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::ApiError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        Self::parse_response(parsed)
    }

    fn model(&self) -> String {
        self.model.clone()
    }
}
