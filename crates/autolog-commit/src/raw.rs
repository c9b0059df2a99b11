//! Raw commit type as read from one log record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subject used when a commit has no message at all.
pub const NO_COMMIT_MESSAGE: &str = "_No commit message_";

/// Diff statistics from a `--shortstat` line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Number of files changed.
    pub files: u64,

    /// Number of inserted lines.
    pub insertions: u64,

    /// Number of deleted lines.
    pub deletions: u64,
}

/// A commit as read from the log, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommit {
    /// The commit hash (SHA).
    pub hash: String,

    /// The ref decoration, without the surrounding parentheses.
    pub refs: Option<String>,

    /// The author date.
    pub date: DateTime<Utc>,

    /// The commit author name.
    pub author: String,

    /// The commit author email.
    pub email: String,

    /// The full, untrimmed commit message.
    pub message: String,

    /// Diff statistics, zero when the record had no stats line.
    pub stats: DiffStats,
}

impl RawCommit {
    /// Creates a new raw commit with no refs and zero stats.
    #[must_use]
    pub fn new(
        hash: impl Into<String>,
        message: impl Into<String>,
        author: impl Into<String>,
        email: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            hash: hash.into(),
            refs: None,
            date,
            author: author.into(),
            email: email.into(),
            message: message.into(),
            stats: DiffStats::default(),
        }
    }

    /// Sets the ref decoration.
    #[must_use]
    pub fn with_refs(mut self, refs: impl Into<String>) -> Self {
        self.refs = Some(refs.into());
        self
    }

    /// Sets the diff statistics.
    #[must_use]
    pub fn with_stats(mut self, stats: DiffStats) -> Self {
        self.stats = stats;
        self
    }

    /// Returns the first non-empty line of the message.
    ///
    /// Falls back to [`NO_COMMIT_MESSAGE`] when the message has no
    /// non-empty line. Whitespace-only lines count as content.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message
            .split('\n')
            .find(|line| !line.is_empty())
            .unwrap_or(NO_COMMIT_MESSAGE)
    }

    /// Returns the short hash (first 7 characters).
    #[must_use]
    pub fn short_hash(&self) -> &str {
        match self.hash.char_indices().nth(7) {
            Some((end, _)) => &self.hash[..end],
            None => &self.hash,
        }
    }
}
