//! Core library for Autolog.
//!
//! This crate turns `git log` output into enriched commit records:
//! - [`Engine`] fetches the top-level merges and unfolds each one
//! - [`enrich`] resolves tags, closed issues, merge requests and links
//! - [`filter_ignored`] drops commits by subject

mod engine;
mod enrich;
mod error;
mod filter;
mod fixes;
mod merge;
mod patterns;
mod platform;
mod tag;

pub use engine::{Engine, format_bytes};
pub use enrich::{enrich, is_breaking, replace_text};
pub use error::{CoreError, CoreResult};
pub use filter::filter_ignored;
pub use fixes::extract_fixes;
pub use merge::extract_merge;
pub use patterns::{CompiledOptions, FixRule, MergeRule, Replacement};
pub use platform::Links;
pub use tag::resolve_tag;
