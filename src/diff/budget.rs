//! Token budgeting for the detailed diff.

use std::collections::HashMap;

use tracing::debug;

use super::triage::ClassifiedFile;

/// Approximate token count: one token per four characters.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// Cap `chunk` at `max_lines` lines.
///
/// A cut chunk ends with exactly one marker line reporting how many lines were
/// removed; the marker itself does not count toward the cap. Lines are
/// counted by `\n` separators, matching [`split_diff`](super::split_diff).
pub fn truncate_chunk(chunk: &str, path: &str, max_lines: usize) -> String {
    let total = chunk.split('\n').count();
    if total <= max_lines {
        return chunk.to_string();
    }

    let mut kept: Vec<&str> = chunk.split('\n').take(max_lines).collect();
    let marker = format!("... [{} more lines truncated from {path}]", total - max_lines);
    kept.push(marker.as_str());
    kept.join("\n")
}

/// Chunks selected for the prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    /// Included chunks joined by newlines, in priority order.
    pub text: String,
    pub included: usize,
    /// True when a chunk did not fit and allocation stopped early.
    pub truncated: bool,
}

/// Fill the token budget with per-file chunks in priority order.
///
/// Files without a chunk are skipped. Allocation stops at the first chunk
/// that would exceed `max_tokens`; later, smaller chunks are not considered.
pub fn allocate(
    files: &[ClassifiedFile<'_>],
    chunks: &HashMap<String, String>,
    max_tokens: usize,
    max_lines_per_file: usize,
) -> Allocation {
    let mut parts = Vec::new();
    let mut used = 0;
    let mut truncated = false;

    for file in files {
        let path = &file.record.path;
        let Some(chunk) = chunks.get(path) else {
            debug!("No diff chunk for {path}");
            continue;
        };

        let chunk = truncate_chunk(chunk, path, max_lines_per_file);
        let cost = estimate_tokens(&chunk);

        if used + cost > max_tokens {
            debug!("Token budget exhausted at {path} ({used} used, {cost} needed)");
            truncated = true;
            break;
        }

        used += cost;
        parts.push(chunk);
    }

    Allocation {
        included: parts.len(),
        text: parts.join("\n"),
        truncated,
    }
}
