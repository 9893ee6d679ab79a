//! Error types for commit-msg-gen modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to collect staged diff: {0}")]
    DiffFailed(#[source] git2::Error),
}

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Unknown provider '{0}' (expected auto, ollama, or claude)")]
    UnknownProvider(String),

    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from LLM providers.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Cannot connect to Ollama at {host}. Is it running? Start it with: ollama serve")]
    OllamaUnavailable { host: String },

    #[error("Model '{model}' not found. Pull it with: ollama pull {model}")]
    ModelNotFound { model: String },

    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,

    #[error("Anthropic API key was rejected")]
    AuthenticationFailed,

    #[error("No LLM provider available. Start Ollama or set ANTHROPIC_API_KEY")]
    NoProviderAvailable,

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response format: {0}")]
    InvalidResponse(String),

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<LlmError>),
}

impl LlmError {
    /// Whether another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Timeout(_) => true,
            LlmError::Request(e) => e.is_timeout() || e.is_connect(),
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
