//! Core error types.

use autolog_config::ConfigError;
use autolog_git::GitError;
use thiserror::Error;

/// Core-related errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Git error: the log could not be read or a record is malformed.
    #[error("git error: {0}")]
    Git(#[from] GitError),

    /// Configuration error, such as a pattern that does not compile.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A merge unfolding task stopped without producing a result.
    #[error("merge unfolding failed: {0}")]
    Unfold(String),
}

impl CoreError {
    /// Returns true if the git process could not be run.
    #[must_use]
    pub fn is_process(&self) -> bool {
        matches!(self, Self::Git(GitError::Process { .. }))
    }

    /// Returns true if a log record did not have the expected shape.
    #[must_use]
    pub fn is_malformed_record(&self) -> bool {
        matches!(self, Self::Git(err) if err.is_malformed_record())
    }

    /// Returns true if the options are invalid.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
