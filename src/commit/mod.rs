//! Commit message vocabulary and response post-processing.

pub mod response;
pub mod types;

pub use response::{append_ticket, clean_commit_message, parse_options, validate_commit_message};
pub use types::CommitType;
