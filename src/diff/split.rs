//! Splitting a combined unified diff into per-file chunks.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::debug;

const HEADER_PREFIX: &str = "diff --git";

static HEADER_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^diff --git a/(.+?) b/").expect("header pattern is valid"));

/// Split `raw` into chunks keyed by file path.
///
/// Each chunk starts at its `diff --git` header and runs up to the next
/// header. Text before the first header is dropped. A header whose path
/// cannot be parsed closes the open chunk, and the lines after it belong to
/// no chunk until the next parseable header.
///
/// Lines are split on `\n` only, so a trailing `\r` stays in the chunk.
pub fn split_diff(raw: &str) -> HashMap<String, String> {
    let mut chunks = HashMap::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in raw.split('\n') {
        if line.starts_with(HEADER_PREFIX) {
            if let Some((path, lines)) = current.take() {
                chunks.insert(path, lines.join("\n"));
            }
            match HEADER_PATH.captures(line) {
                Some(caps) => current = Some((caps[1].to_string(), vec![line])),
                None => debug!("Skipping unparseable diff header: {line:?}"),
            }
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some((path, lines)) = current {
        chunks.insert(path, lines.join("\n"));
    }

    chunks
}
