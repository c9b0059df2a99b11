//! Configuration error types.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    NotFound(std::path::PathBuf),

    /// Invalid TOML syntax.
    #[error("invalid TOML: {0}")]
    InvalidToml(#[from] toml::de::Error),

    /// A user-supplied regular expression does not compile.
    #[error("invalid pattern for `{option}`: {source}")]
    InvalidPattern {
        /// The option holding the pattern.
        option: &'static str,
        /// The compilation error.
        #[source]
        source: regex::Error,
    },

    /// Unknown hosting platform name.
    #[error("unknown platform `{0}` (expected github, gitlab, bitbucket, azure or visualstudio)")]
    InvalidPlatform(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
