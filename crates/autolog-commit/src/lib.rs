//! Commit record types for Autolog.
//!
//! This crate provides the data model shared by every other crate:
//! - [`RawCommit`]: the fields of one log record, before enrichment
//! - [`Commit`]: an enriched commit, ready for changelog rendering
//! - [`Remote`]: the hosting remote used to build hyperlinks

mod commit;
mod raw;
mod remote;

pub use commit::{Commit, CommitBuilder, Fix, Merge};
pub use raw::{DiffStats, NO_COMMIT_MESSAGE, RawCommit};
pub use remote::Remote;
