//! Client for the external language-model provider.
//!
//! This crate defines the one seam the planner and analyzer talk through:
//! - [`LlmClient`]: a single prompt in, raw text out
//! - [`CompletionRequest`]: model id, output cap, prompt and optional images
//! - [`AnthropicClient`]: the production implementation over HTTP
//!
//! Callers own timeouts and never trust the returned text; this layer only
//! reports transport and provider failures.

pub mod anthropic;
#[cfg(feature = "testing")]
pub mod testing;

use async_trait::async_trait;
use thiserror::Error;

pub use anthropic::AnthropicClient;

/// Errors that can occur when calling the model provider
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Model API key is not configured: set {0}")]
    MissingApiKey(&'static str),

    #[error("Failed to reach model provider: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model provider returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model provider returned no text output")]
    EmptyResponse,

    #[error("Invalid response from model provider: {0}")]
    InvalidResponse(String),
}

/// An image embedded in a prompt, already base64 encoded
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInput {
    pub media_type: String,
    pub data: String,
}

/// One model call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub prompt: String,
    pub images: Vec<ImageInput>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            system: String::new(),
            prompt: String::new(),
            images: Vec::new(),
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn image(mut self, media_type: impl Into<String>, data: impl Into<String>) -> Self {
        self.images.push(ImageInput {
            media_type: media_type.into(),
            data: data.into(),
        });
        self
    }
}

/// Unified interface for a text-producing model provider
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one completion and return the raw text output
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;

    /// Get the provider name for logging
    fn provider_name(&self) -> &str;
}
