//! Ollama client for local models.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::LlmError;

use super::{LlmClient, LlmResponse, MAX_OUTPUT_TOKENS, SYSTEM_PROMPT, TEMPERATURE, request_timeout};

pub const DEFAULT_MODEL: &str = "mistral:7b";
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Environment variable overriding the Ollama host.
pub const HOST_ENV_VAR: &str = "OLLAMA_HOST";

/// How long Ollama keeps the model loaded after a request.
const KEEP_ALIVE: &str = "10m";

/// Timeout for the quick liveness checks.
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    keep_alive: &'a str,
    options: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    eval_count: u64,
}

#[derive(Deserialize)]
struct RunningModels {
    #[serde(default)]
    models: Vec<RunningModel>,
}

#[derive(Deserialize)]
struct RunningModel {
    #[serde(default)]
    name: String,
}

/// Client for Ollama's `/api/generate` endpoint.
pub struct OllamaClient {
    model: String,
    host: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a client without contacting the server.
    ///
    /// `host` defaults to `OLLAMA_HOST`, then `http://localhost:11434`.
    pub fn new(model: Option<String>, host: Option<String>) -> Result<Self, LlmError> {
        let timeout = request_timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::Request)?;
        let host = host
            .or_else(|| env::var(HOST_ENV_VAR).ok().filter(|h| !h.is_empty()))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Ok(Self {
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            host: host.trim_end_matches('/').to_string(),
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Create a client and check that the server answers.
    pub async fn connect(model: Option<String>, host: Option<String>) -> Result<Self, LlmError> {
        let client = Self::new(model, host)?;
        client.verify_connection().await?;
        Ok(client)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn verify_connection(&self) -> Result<(), LlmError> {
        let unavailable = || LlmError::OllamaUnavailable {
            host: self.host.clone(),
        };
        let response = self
            .client
            .get(format!("{}/api/tags", self.host))
            .timeout(CHECK_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                debug!("Ollama liveness check failed: {e}");
                unavailable()
            })?;
        if !response.status().is_success() {
            return Err(unavailable());
        }
        Ok(())
    }

    /// Whether the model is already loaded in memory (`/api/ps`).
    pub async fn is_model_loaded(&self) -> bool {
        let response = match self
            .client
            .get(format!("{}/api/ps", self.host))
            .timeout(CHECK_TIMEOUT)
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => r,
            _ => return false,
        };
        match response.json::<RunningModels>().await {
            Ok(running) => running
                .models
                .iter()
                .any(|m| model_matches(&m.name, &self.model)),
            Err(_) => false,
        }
    }

    /// Load the model with a one-token request so the next call is fast.
    pub async fn warmup(&self) -> Result<(), LlmError> {
        if self.is_model_loaded().await {
            debug!("Model {} already loaded", self.model);
            return Ok(());
        }
        let request = GenerateRequest {
            model: &self.model,
            prompt: "hi",
            system: None,
            stream: false,
            keep_alive: KEEP_ALIVE,
            options: json!({ "num_predict": 1 }),
        };
        self.post_generate(&request).await.map(|_| ())
    }

    async fn post_generate(&self, request: &GenerateRequest<'_>) -> Result<GenerateResponse, LlmError> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.host))
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotFound {
                model: self.model.clone(),
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    fn map_transport_error(&self, error: reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout(self.timeout_secs)
        } else if error.is_connect() {
            LlmError::OllamaUnavailable {
                host: self.host.clone(),
            }
        } else {
            LlmError::Request(error)
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    fn name(&self) -> String {
        format!("Ollama ({})", self.model)
    }

    async fn generate(&self, prompt: &str) -> Result<LlmResponse, LlmError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            system: Some(SYSTEM_PROMPT),
            stream: false,
            keep_alive: KEEP_ALIVE,
            options: json!({
                "temperature": TEMPERATURE,
                "num_predict": MAX_OUTPUT_TOKENS,
            }),
        };
        let result = self.post_generate(&request).await?;

        Ok(LlmResponse {
            content: result.response.trim().to_string(),
            model: self.model.clone(),
            tokens_used: result.eval_count,
        })
    }
}

/// Compare model names, treating an untagged name as `:latest`.
fn model_matches(running: &str, wanted: &str) -> bool {
    if running.is_empty() || wanted.is_empty() {
        return false;
    }
    with_tag(running) == with_tag(wanted)
}

fn with_tag(name: &str) -> String {
    if name.contains(':') {
        name.to_string()
    } else {
        format!("{name}:latest")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_new_uses_defaults() {
        temp_env::with_var_unset(HOST_ENV_VAR, || {
            let client = OllamaClient::new(None, None).unwrap();
            assert_eq!(client.model(), DEFAULT_MODEL);
            assert_eq!(client.host, DEFAULT_HOST);
            assert_eq!(client.name(), "Ollama (mistral:7b)");
        });
    }

    #[test]
    #[serial]
    fn test_new_reads_host_from_env() {
        temp_env::with_var(HOST_ENV_VAR, Some("http://gpu-box:11434/"), || {
            let client = OllamaClient::new(Some("llama3.2:3b".into()), None).unwrap();
            assert_eq!(client.host, "http://gpu-box:11434");
            assert_eq!(client.model(), "llama3.2:3b");
        });
    }

    #[test]
    fn test_explicit_host_wins() {
        let client = OllamaClient::new(None, Some("http://127.0.0.1:9999".into())).unwrap();
        assert_eq!(client.host, "http://127.0.0.1:9999");
    }

    #[test]
    fn test_model_matches_exact_and_latest_tag() {
        assert!(model_matches("mistral:7b", "mistral:7b"));
        assert!(model_matches("llama3:latest", "llama3"));
        assert!(model_matches("llama3", "llama3:latest"));
        assert!(!model_matches("mistral:7b-instruct", "mistral:7b"));
        assert!(!model_matches("mistral:7b", "mistral"));
    }

    #[test]
    fn test_model_matches_rejects_empty_names() {
        assert!(!model_matches("", "mistral:7b"));
        assert!(!model_matches("mistral:7b", ""));
    }
}
