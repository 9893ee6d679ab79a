//! commit-msg-gen - generate commit messages for staged changes with an LLM.
//!
//! # Overview
//!
//! Staged changes are triaged by file priority, squeezed into a token budget,
//! and assembled into a prompt for a local Ollama model or Claude. The
//! response is cleaned up into one or more conventional commit messages.

pub mod commit;
pub mod config;
pub mod diff;
pub mod error;
pub mod git;
pub mod llm;
pub mod prompt;

// Re-export commonly used types
pub use commit::CommitType;
pub use config::Config;
pub use diff::{ChangeRecord, ChangeSet, DiffProcessor, PriorityTier, ProcessedContext, ProcessorConfig};
pub use error::{ConfigError, GitError, LlmError};
pub use llm::{LlmClient, LlmResponse, Provider};
pub use prompt::{CommitStyle, PromptAssemblyConfig, assemble};
