//! Diff triage and context budgeting.
//!
//! Turns a staged change set into a small, prioritized, token-bounded context:
//! classify each path, drop noise, order by importance, then fit per-file diff
//! chunks into a fixed token budget.

pub mod budget;
pub mod classify;
pub mod model;
pub mod processor;
pub mod split;
pub mod summary;
pub mod triage;

pub use budget::{Allocation, allocate, estimate_tokens, truncate_chunk};
pub use classify::{Classifier, EVALUATION_ORDER, PriorityTier, classify};
pub use model::{ChangeRecord, ChangeSet, parse_numstat};
pub use processor::{DiffProcessor, FileDetail, ProcessedContext, ProcessorConfig};
pub use split::split_diff;
pub use summary::render_summary;
pub use triage::{ClassifiedFile, Triage, triage};
