//! Anthropic Messages API client.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::{CompletionRequest, LlmClient, LlmError};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API.
///
/// Cloning is cheap; the underlying `reqwest::Client` shares its pool.
#[derive(Clone)]
pub struct AnthropicClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Create a new client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different host (proxies, local mocks)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create from `ANTHROPIC_API_KEY` and the optional `ANTHROPIC_BASE_URL`
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or(LlmError::MissingApiKey("ANTHROPIC_API_KEY"))?;
        let client = Self::new(api_key);
        Ok(match std::env::var("ANTHROPIC_BASE_URL") {
            Ok(url) if !url.is_empty() => client.with_base_url(url),
            _ => client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Messages API body. Images precede the text block.
pub(crate) fn build_body(request: &CompletionRequest) -> Value {
    let mut content: Vec<Value> = request
        .images
        .iter()
        .map(|image| {
            json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": image.media_type,
                    "data": image.data,
                }
            })
        })
        .collect();
    content.push(json!({"type": "text", "text": request.prompt}));

    let mut body = json!({
        "model": request.model,
        "max_tokens": request.max_tokens,
        "messages": [{"role": "user", "content": content}],
    });
    if !request.system.is_empty() {
        body["system"] = json!(request.system);
    }
    body
}

/// Concatenate every text block of a Messages API response.
pub(crate) fn extract_text(response: &Value) -> Result<String, LlmError> {
    let blocks = response
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| LlmError::InvalidResponse("missing `content` array".into()))?;

    let text: String = blocks
        .iter()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        debug!(
            "Calling {} with {} image(s), max_tokens={}",
            request.model,
            request.images.len(),
            request.max_tokens
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&build_body(&request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Model provider error {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        extract_text(&payload)
    }

    fn provider_name(&self) -> &str {
        "Anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_places_images_before_text() {
        let request = CompletionRequest::new("claude-test", 256)
            .system("system text")
            .prompt("what is this")
            .image("image/jpeg", "QUJD");

        let body = build_body(&request);
        let content = body["messages"][0]["content"].as_array().unwrap();

        assert_eq!(body["model"], "claude-test");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["system"], "system text");
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["data"], "QUJD");
        assert_eq!(content[1]["text"], "what is this");
    }

    #[test]
    fn test_body_omits_empty_system() {
        let body = build_body(&CompletionRequest::new("m", 1).prompt("hi"));
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_extract_text_joins_text_blocks() {
        let response = json!({
            "content": [
                {"type": "text", "text": "{\"a\":"},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "1}"}
            ]
        });
        assert_eq!(extract_text(&response).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_extract_text_errors() {
        assert!(matches!(
            extract_text(&json!({"content": []})),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            extract_text(&json!({"error": "x"})),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = AnthropicClient::new("key").with_base_url("http://localhost:9999/");
        assert_eq!(client.base_url(), "http://localhost:9999");
        assert_eq!(client.provider_name(), "Anthropic");
    }
}
