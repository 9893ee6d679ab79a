//! Options that shape the assembled prompt.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::commit::CommitType;

/// Default subject length cap for the assembler.
pub const DEFAULT_MAX_SUBJECT_LENGTH: usize = 50;

/// Commit message style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitStyle {
    /// `type(scope): subject` with a bulleted body.
    #[default]
    Conventional,
    /// Plain subject line, no type prefix.
    Simple,
    /// Conventional format with a longer body.
    Detailed,
}

impl CommitStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitStyle::Conventional => "conventional",
            CommitStyle::Simple => "simple",
            CommitStyle::Detailed => "detailed",
        }
    }
}

impl fmt::Display for CommitStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommitStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conventional" => Ok(Self::Conventional),
            "simple" => Ok(Self::Simple),
            "detailed" => Ok(Self::Detailed),
            _ => Err(format!(
                "Unknown style: {s} (expected conventional, simple, or detailed)"
            )),
        }
    }
}

/// User-provided context for prompt assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptAssemblyConfig {
    /// Free-text context from the developer; `None` omits the context block.
    pub hint: Option<String>,
    /// Commit type the model must use; `None` offers the full vocabulary.
    pub forced_type: Option<CommitType>,
    /// Number of alternative messages to request (at least one).
    pub num_options: usize,
    /// Number of changed files, used to size the body.
    pub file_count: usize,
    pub style: CommitStyle,
    pub include_body: bool,
    pub max_subject_length: usize,
}

impl Default for PromptAssemblyConfig {
    fn default() -> Self {
        Self {
            hint: None,
            forced_type: None,
            num_options: 1,
            file_count: 0,
            style: CommitStyle::Conventional,
            include_body: true,
            max_subject_length: DEFAULT_MAX_SUBJECT_LENGTH,
        }
    }
}
