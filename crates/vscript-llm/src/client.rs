//! Anthropic Messages API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LlmError, LlmResult};

/// API version header required by the provider.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Boundary over the generative-language provider.
///
/// One call, one completion. Callers never retry automatically; "generate
/// again" is the end user's decision.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> LlmResult<String>;
}

/// Reqwest-backed client for the Anthropic Messages API.
pub struct AnthropicClient {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

/// Messages API request.
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

/// Messages API response.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Error body returned by the provider on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ProviderErrorResponse {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    #[serde(default)]
    message: String,
}

impl AnthropicClient {
    /// Create a client. A missing key is not an error here; it becomes one
    /// on the first completion attempt.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
            base_url: "https://api.anthropic.com".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the base URL (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LanguageModel for AnthropicClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> LlmResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingCredential("ANTHROPIC_API_KEY"))?;

        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::provider(format!("{status}: {message}")));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::provider(format!("unreadable response: {e}")))?;

        let text = parsed
            .content
            .iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text.clone())
            .ok_or(LlmError::EmptyResponse)?;

        debug!(model = %self.model, chars = text.len(), "Model completion received");
        Ok(text)
    }
}
