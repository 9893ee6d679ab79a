//! End-to-end diff processing: triage, summary, and budgeted detail.

use tracing::debug;

use super::budget::allocate;
use super::classify::Classifier;
use super::model::ChangeSet;
use super::split::split_diff;
use super::summary::render_summary;
use super::triage::triage;

/// Default token budget for the detailed diff.
pub const DEFAULT_MAX_TOKENS: usize = 3000;

/// Default per-file line cap.
pub const DEFAULT_MAX_LINES_PER_FILE: usize = 200;

/// Limits applied while building the detailed diff.
///
/// Both limits must be positive; zero values are rejected when the user
/// configuration is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub max_tokens: usize,
    pub max_lines_per_file: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            max_lines_per_file: DEFAULT_MAX_LINES_PER_FILE,
        }
    }
}

/// Per-file stats kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDetail {
    pub path: String,
    pub additions: usize,
    pub deletions: usize,
}

/// Context handed to the prompt assembler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedContext {
    pub summary: String,
    pub detailed_diff: String,
    pub total_files: usize,
    /// Files whose diff chunk made it into `detailed_diff`.
    pub included_files: usize,
    /// Noise files dropped by triage.
    pub filtered_files: usize,
    pub truncated: bool,
    /// Non-noise files in priority order.
    pub file_details: Vec<FileDetail>,
}

impl ProcessedContext {
    pub fn estimated_tokens(&self) -> usize {
        (self.summary.chars().count() + self.detailed_diff.chars().count()) / 4
    }
}

/// Runs the full triage and budgeting pipeline.
#[derive(Default)]
pub struct DiffProcessor {
    config: ProcessorConfig,
    classifier: Classifier,
}

impl DiffProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            config,
            classifier: Classifier::new(),
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process a change set. Pure: identical input yields identical output.
    pub fn process(&self, changes: &ChangeSet) -> ProcessedContext {
        let triaged = triage(&changes.files, &self.classifier);
        let summary = render_summary(&triaged.files, triaged.noise_count);

        let chunks = split_diff(&changes.full_diff);
        let allocation = allocate(
            &triaged.files,
            &chunks,
            self.config.max_tokens,
            self.config.max_lines_per_file,
        );

        debug!(
            "Processed {} files: {} included, {} filtered, truncated={}",
            changes.file_count(),
            allocation.included,
            triaged.noise_count,
            allocation.truncated
        );

        let file_details = triaged
            .files
            .iter()
            .map(|f| FileDetail {
                path: f.record.path.clone(),
                additions: f.record.additions,
                deletions: f.record.deletions,
            })
            .collect();

        ProcessedContext {
            summary,
            detailed_diff: allocation.text,
            total_files: changes.file_count(),
            included_files: allocation.included,
            filtered_files: triaged.noise_count,
            truncated: allocation.truncated,
            file_details,
        }
    }
}
