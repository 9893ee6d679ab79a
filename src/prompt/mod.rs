//! Prompt assembly: turns processed diff context into an LLM prompt.

pub mod builder;
pub mod config;
pub mod tables;

pub use builder::{assemble, bullet_instruction, sanitize_diff};
pub use config::{CommitStyle, DEFAULT_MAX_SUBJECT_LENGTH, PromptAssemblyConfig};
