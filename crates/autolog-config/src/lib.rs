//! Configuration management for Autolog.
//!
//! This crate handles loading the `autolog.toml` options file and defines the
//! immutable [`Options`] bag read by every enrichment step.

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{CONFIG_FILE_NAME, find_and_load_config_from, load_config};
pub use schema::{DEFAULT_UNFOLD_CONCURRENCY, Options, Platform, ReplaceRule};
