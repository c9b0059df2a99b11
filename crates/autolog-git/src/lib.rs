//! Git log layer for Autolog.
//!
//! This crate provides everything that touches the raw `git log` protocol:
//! - Log format negotiation and the record sentinels
//! - The shapes of the log commands issued by the engine
//! - The [`LogSource`] trait and its [`GitCli`] implementation
//! - Tokenizing log text into [`RawCommit`](autolog_commit::RawCommit) records

mod command;
mod error;
mod format;
mod record;
mod source;

pub use command::GitCommand;
pub use error::{GitError, GitResult};
pub use format::{
    BODY_FORMAT, COMMIT_SEPARATOR, FALLBACK_BODY_FORMAT, LogFormat, MESSAGE_SEPARATOR,
    parse_git_version,
};
pub use record::{parse_log, parse_record, parse_stats, split_records};
pub use source::{GitCli, LogOutput, LogSource, Progress};
