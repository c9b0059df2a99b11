//! Git error types.

use thiserror::Error;

/// Longest record excerpt kept in a [`GitError::MalformedRecord`].
const RECORD_EXCERPT_LEN: usize = 120;

/// Git-related errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git process could not be run or its output could not be read.
    #[error("failed to run `{command}`: {source}")]
    Process {
        /// The command line.
        command: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The command was cancelled before it finished.
    #[error("`{command}` was cancelled")]
    Cancelled {
        /// The command line.
        command: String,
    },

    /// A log record does not have the expected shape.
    #[error("malformed log record ({reason}): {record:?}")]
    MalformedRecord {
        /// What was wrong with the record.
        reason: String,
        /// The start of the offending record.
        record: String,
    },
}

impl GitError {
    /// Creates a [`GitError::MalformedRecord`], keeping only the start of the record.
    pub fn malformed(reason: impl Into<String>, record: &str) -> Self {
        let record = match record.char_indices().nth(RECORD_EXCERPT_LEN) {
            Some((end, _)) => format!("{}…", &record[..end]),
            None => record.to_string(),
        };
        Self::MalformedRecord {
            reason: reason.into(),
            record,
        }
    }

    /// Returns true if this error comes from an unexpected record shape.
    #[must_use]
    pub fn is_malformed_record(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }
}

/// Result type for git operations.
pub type GitResult<T> = Result<T, GitError>;
