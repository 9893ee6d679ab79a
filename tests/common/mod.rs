//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;

use git2::{Oid, Repository, Signature};

use commit_msg_gen::diff::{ChangeRecord, ChangeSet};

/// Build a unified-diff chunk for `path` with `added` added lines.
pub fn diff_chunk(path: &str, added: usize) -> String {
    let mut lines = vec![
        format!("diff --git a/{path} b/{path}"),
        format!("--- a/{path}"),
        format!("+++ b/{path}"),
        format!("@@ -0,0 +1,{added} @@"),
    ];
    lines.extend((1..=added).map(|i| format!("+line {i} of {path}")));
    lines.join("\n")
}

/// Build a change set whose diff text contains one chunk per record.
///
/// Each entry is `(path, added_lines, deleted_lines)`; the chunk carries
/// `added_lines` `+` lines.
pub fn change_set(files: &[(&str, usize, usize)]) -> ChangeSet {
    let records = files
        .iter()
        .map(|(path, adds, dels)| ChangeRecord::new(*path, *adds, *dels))
        .collect();
    let full_diff = files
        .iter()
        .map(|(path, adds, _)| diff_chunk(path, *adds))
        .collect::<Vec<_>>()
        .join("\n");
    ChangeSet::new(records, full_diff)
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file into the working tree without staging it.
    pub fn write(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
    }

    /// Write and stage a file.
    pub fn stage(&self, name: &str, content: &str) {
        self.write(name, content);
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Stage the removal of a tracked file.
    pub fn stage_removal(&self, name: &str) {
        std::fs::remove_file(self.dir.path().join(name)).expect("Failed to remove file");
        let mut index = self.repo.index().expect("Failed to get index");
        index.remove_path(Path::new(name)).expect("Failed to remove from index");
        index.write().expect("Failed to write index");
    }

    /// Commit whatever is staged. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = self.signature();
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
