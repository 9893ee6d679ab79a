//! Conventional commit type vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Conventional commit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Refactor,
    Chore,
    Docs,
    Test,
    Style,
    Perf,
    Ci,
    Build,
}

impl CommitType {
    /// Every type, in the order they are offered to the model.
    pub const ALL: [CommitType; 10] = [
        CommitType::Feat,
        CommitType::Fix,
        CommitType::Refactor,
        CommitType::Chore,
        CommitType::Docs,
        CommitType::Test,
        CommitType::Style,
        CommitType::Perf,
        CommitType::Ci,
        CommitType::Build,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Refactor => "refactor",
            CommitType::Chore => "chore",
            CommitType::Docs => "docs",
            CommitType::Test => "test",
            CommitType::Style => "style",
            CommitType::Perf => "perf",
            CommitType::Ci => "ci",
            CommitType::Build => "build",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CommitType::Feat => "A new feature or capability",
            CommitType::Fix => "A bug fix",
            CommitType::Refactor => "Code restructuring without behavior change",
            CommitType::Chore => "Maintenance tasks, dependencies, tooling",
            CommitType::Docs => "Documentation only changes",
            CommitType::Test => "Adding or updating tests",
            CommitType::Style => "Formatting, whitespace, no code change",
            CommitType::Perf => "Performance improvement",
            CommitType::Ci => "CI/CD configuration changes",
            CommitType::Build => "Build system or external dependency changes",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        CommitType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| {
                let valid: Vec<&str> = CommitType::ALL.iter().map(|t| t.as_str()).collect();
                format!("Unknown commit type: {s} (expected one of: {})", valid.join(", "))
            })
    }
}
