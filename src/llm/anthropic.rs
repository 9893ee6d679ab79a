//! Anthropic Messages API client.
//!
//! Authenticates with the `x-api-key` header and sends the system prompt as a
//! top-level field.

use std::env;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::LlmError;

use super::{LlmClient, LlmResponse, MAX_OUTPUT_TOKENS, SYSTEM_PROMPT, TEMPERATURE, request_timeout};

/// Environment variable holding the API key.
pub const API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for Claude models over the Anthropic API.
pub struct AnthropicClient {
    model: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, model: Option<String>) -> Result<Self, LlmError> {
        let timeout = request_timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::Request)?;

        Ok(Self {
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Create a client from `ANTHROPIC_API_KEY`.
    pub fn from_env(model: Option<String>) -> Result<Self, LlmError> {
        let api_key = env::var(API_KEY_ENV_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;
        Self::new(api_key, model)
    }

    /// Point the client at a different endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn name(&self) -> String {
        format!("Claude ({})", self.model)
    }

    async fn generate(&self, prompt: &str) -> Result<LlmResponse, LlmError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "temperature": TEMPERATURE,
            "system": SYSTEM_PROMPT,
            "messages": [{ "role": "user", "content": prompt }],
        });

        debug!(model = %self.model, "Sending Anthropic request");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout_secs)
                } else {
                    LlmError::Request(e)
                }
            })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(LlmError::AuthenticationFailed);
        }
        if !response.status().is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            warn!(status, %message, "Anthropic API error");
            return Err(LlmError::Api { status, message });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = parsed
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");
        if content.trim().is_empty() {
            return Err(LlmError::InvalidResponse(
                "response contained no text".to_string(),
            ));
        }

        let tokens_used = parsed
            .usage
            .map(|u| u.input_tokens + u.output_tokens)
            .unwrap_or(0);

        Ok(LlmResponse {
            content: content.trim().to_string(),
            model: self.model.clone(),
            tokens_used,
        })
    }
}
