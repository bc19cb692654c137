//! Generative model provider integrations for rasmalai
//!
//! This crate provides the provider abstraction used by the conversation
//! manager, image payload encoding, and the Gemini HTTP client.

pub mod base;
pub mod gemini;
pub mod image;

pub use base::{GenerateResponse, GenerativeProvider, InlineImage, ProviderError, ProviderResult};
pub use gemini::GeminiClient;
pub use image::ImageAttachment;
