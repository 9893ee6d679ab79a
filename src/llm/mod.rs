//! LLM clients for commit message generation.

pub mod anthropic;
pub mod ollama;
pub mod retry;

use std::env;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LlmError;

pub use anthropic::AnthropicClient;
pub use ollama::OllamaClient;
pub use retry::{generate_commit_message, retry_with_backoff};

/// Default request timeout (5 minutes, enough for CPU inference).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable to override the default timeout.
pub const TIMEOUT_ENV_VAR: &str = "CM_TIMEOUT";

/// Sampling temperature shared by both backends.
pub(crate) const TEMPERATURE: f32 = 0.4;

/// Upper bound on generated tokens.
pub(crate) const MAX_OUTPUT_TOKENS: u32 = 1000;

/// System prompt sent alongside every request.
pub const SYSTEM_PROMPT: &str = "You are a senior software engineer who writes precise, informative git commit messages. You have reviewed thousands of pull requests at large companies and open-source projects.

Your expertise:
- Conventional commit format (type, scope, subject, body)
- Finding the PRIMARY purpose of a change from its diff
- Writing for the developer reading git log while debugging production

Your standards:
- Every word earns its place
- The diff shows WHAT; you explain WHY
- Specific verbs over vague ones (never \"update\", \"change\", \"modify\")
- Bullets add context the subject line cannot capture";

/// Get the configured request timeout.
///
/// Reads `CM_TIMEOUT` (seconds); unset, empty, or invalid values fall back to
/// 300 seconds, with a warning for invalid ones.
pub fn request_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Which backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Ollama if reachable, otherwise Claude.
    #[default]
    Auto,
    Ollama,
    Claude,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Auto => "auto",
            Provider::Ollama => "ollama",
            Provider::Claude => "claude",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "ollama" => Ok(Self::Ollama),
            "claude" => Ok(Self::Claude),
            _ => Err(format!(
                "Unknown provider: {s} (expected auto, ollama, or claude)"
            )),
        }
    }
}

/// A completed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub tokens_used: u64,
}

/// A backend that turns a prompt into text.
///
/// This abstraction allows mocking the HTTP backends in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Display name including the model, e.g. `Ollama (mistral:7b)`.
    fn name(&self) -> String;

    /// Send one prompt and return the raw response.
    async fn generate(&self, prompt: &str) -> Result<LlmResponse, LlmError>;
}

/// Build a client for `provider`.
///
/// `Auto` tries Ollama first and falls back to Claude; if neither is usable
/// the result is [`LlmError::NoProviderAvailable`].
pub async fn get_client(
    provider: Provider,
    model: Option<String>,
) -> Result<Box<dyn LlmClient>, LlmError> {
    match provider {
        Provider::Ollama => Ok(Box::new(OllamaClient::connect(model, None).await?)),
        Provider::Claude => Ok(Box::new(AnthropicClient::from_env(model)?)),
        Provider::Auto => {
            match OllamaClient::connect(model.clone(), None).await {
                Ok(client) => return Ok(Box::new(client)),
                Err(e) => debug!("Ollama unavailable, trying Claude: {e}"),
            }
            match AnthropicClient::from_env(model) {
                Ok(client) => Ok(Box::new(client)),
                Err(e) => {
                    debug!("Claude unavailable: {e}");
                    Err(LlmError::NoProviderAvailable)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_request_timeout_default() {
        temp_env::with_var_unset(TIMEOUT_ENV_VAR, || {
            assert_eq!(request_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        });
    }

    #[test]
    #[serial]
    fn test_request_timeout_from_env() {
        temp_env::with_var(TIMEOUT_ENV_VAR, Some("600"), || {
            assert_eq!(request_timeout(), Duration::from_secs(600));
        });
    }

    #[test]
    #[serial]
    fn test_request_timeout_invalid_env_uses_default() {
        temp_env::with_var(TIMEOUT_ENV_VAR, Some("soon"), || {
            assert_eq!(request_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        });
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("auto".parse::<Provider>().unwrap(), Provider::Auto);
        assert_eq!("Ollama".parse::<Provider>().unwrap(), Provider::Ollama);
        assert_eq!("CLAUDE".parse::<Provider>().unwrap(), Provider::Claude);
        assert!("openai".parse::<Provider>().is_err());
    }
}
