//! Staged change collection using git2.

use std::path::Path;

use git2::{Diff, DiffDelta, DiffFormat, ErrorCode, Patch, Repository, Tree};
use tracing::{debug, warn};

use crate::diff::{ChangeRecord, ChangeSet};
use crate::error::GitError;

/// Open the repository containing `path`, searching parent directories.
pub fn open_repository(path: impl AsRef<Path>) -> Result<Repository, GitError> {
    Repository::discover(path).map_err(GitError::OpenRepository)
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// `Ok(Some(tree))` for repos with a valid HEAD, or `Err(GitError::DiffFailed)`
/// for real errors (corrupt HEAD, missing objects).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

/// Collect the staged changes (HEAD tree against the index).
///
/// Per-file counts come from patch line stats; binary files count as zero.
/// An empty change set is returned as-is; deciding what to do with it is up
/// to the caller.
pub fn collect_staged(repo: &Repository) -> Result<ChangeSet, GitError> {
    let head_tree = resolve_head_tree(repo)?;
    let diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, None)
        .map_err(GitError::DiffFailed)?;

    let files = collect_records(&diff)?;
    let full_diff = render_patch(&diff);

    debug!(
        "Collected {} staged files ({} bytes of diff)",
        files.len(),
        full_diff.len()
    );

    Ok(ChangeSet::new(files, full_diff))
}

fn collect_records(diff: &Diff<'_>) -> Result<Vec<ChangeRecord>, GitError> {
    let mut records = Vec::with_capacity(diff.deltas().len());

    for (idx, delta) in diff.deltas().enumerate() {
        let path = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        if path.is_empty() {
            continue;
        }

        let (additions, deletions) = match Patch::from_diff(diff, idx).map_err(GitError::DiffFailed)? {
            Some(patch) => {
                let (_context, additions, deletions) =
                    patch.line_stats().map_err(GitError::DiffFailed)?;
                (additions, deletions)
            }
            None => (0, 0),
        };

        records.push(ChangeRecord::new(path, additions, deletions));
    }

    Ok(records)
}

/// Render the diff in unified patch format.
///
/// The `diff --git` line of each file header is rewritten from the delta's
/// paths, so names git would quote and escape come out as plain `a/`/`b/`
/// paths matching the change records.
fn render_patch(diff: &Diff<'_>) -> String {
    let mut text = String::new();

    if let Err(e) = diff.print(DiffFormat::Patch, |delta, _hunk, line| {
        let origin = line.origin();
        let content = String::from_utf8_lossy(line.content());
        match origin {
            '+' | '-' | ' ' => {
                text.push(origin);
                text.push_str(&content);
            }
            'F' => text.push_str(&unquoted_header(&delta, &content)),
            _ => text.push_str(&content),
        }
        true
    }) {
        warn!("Failed to render staged diff text: {e}");
    }

    text
}

fn unquoted_header(delta: &DiffDelta<'_>, header: &str) -> String {
    let old = delta.old_file().path().or_else(|| delta.new_file().path());
    let new = delta.new_file().path().or_else(|| delta.old_file().path());
    let (Some(old), Some(new)) = (old, new) else {
        return header.to_string();
    };

    let first = format!(
        "diff --git a/{} b/{}",
        old.to_string_lossy(),
        new.to_string_lossy()
    );
    match header.split_once('\n') {
        Some((_, rest)) => format!("{first}\n{rest}"),
        None => first,
    }
}
