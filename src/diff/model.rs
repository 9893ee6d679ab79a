//! Change records and stat-line parsing.

use tracing::debug;

/// A single file's contribution to a staged change set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    /// Repository-relative path, unique within a change set.
    pub path: String,
    pub additions: usize,
    pub deletions: usize,
}

impl ChangeRecord {
    pub fn new(path: impl Into<String>, additions: usize, deletions: usize) -> Self {
        Self {
            path: path.into(),
            additions,
            deletions,
        }
    }

    /// Additions plus deletions.
    pub fn total_changes(&self) -> usize {
        self.additions + self.deletions
    }
}

/// All staged changes: per-file stats in tool order plus the combined diff text.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub files: Vec<ChangeRecord>,
    pub full_diff: String,
}

impl ChangeSet {
    pub fn new(files: Vec<ChangeRecord>, full_diff: impl Into<String>) -> Self {
        Self {
            files,
            full_diff: full_diff.into(),
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn total_additions(&self) -> usize {
        self.files.iter().map(|f| f.additions).sum()
    }

    pub fn total_deletions(&self) -> usize {
        self.files.iter().map(|f| f.deletions).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Parse `additions<TAB>deletions<TAB>path` stat lines.
///
/// Binary files report `-` for both counts and are recorded as zero. Lines with
/// fewer than three fields or non-numeric counts are skipped.
pub fn parse_numstat(text: &str) -> Vec<ChangeRecord> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let record = parse_numstat_line(line);
            if record.is_none() {
                debug!("Skipping malformed stat line: {line:?}");
            }
            record
        })
        .collect()
}

fn parse_numstat_line(line: &str) -> Option<ChangeRecord> {
    let mut parts = line.splitn(3, '\t');
    let additions = parse_count(parts.next()?)?;
    let deletions = parse_count(parts.next()?)?;
    let path = parts.next()?;
    if path.is_empty() {
        return None;
    }
    Some(ChangeRecord::new(path, additions, deletions))
}

fn parse_count(field: &str) -> Option<usize> {
    if field == "-" {
        Some(0)
    } else {
        field.parse().ok()
    }
}
