//! Options schema.

use std::fmt;
use std::str::FromStr;

use autolog_commit::Remote;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

/// Default number of merge commits unfolded at the same time.
pub const DEFAULT_UNFOLD_CONCURRENCY: usize = 8;

/// Options controlling commit extraction and enrichment.
///
/// Every field is optional in `autolog.toml`; keys are kebab-case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Options {
    /// Prefix stripped from version tags (e.g. `v` or `release-`).
    pub tag_prefix: String,

    /// Pattern a tag must match; when unset, tags must be valid semver.
    pub tag_pattern: Option<String>,

    /// Pattern recognising closed issues in commit messages.
    pub issue_pattern: Option<String>,

    /// Issue link template, `{id}` is replaced by the issue id.
    pub issue_url: Option<String>,

    /// Pattern recognising merge commits, replacing the built-in ones.
    pub merge_pattern: Option<String>,

    /// Pattern flagging a commit as a breaking change.
    pub breaking_pattern: Option<String>,

    /// Commits whose subject matches this pattern are dropped.
    pub ignore_commit_pattern: Option<String>,

    /// Text replacements applied in order to subjects and merge titles.
    pub replace_text: Vec<ReplaceRule>,

    /// Hosting platform, overriding detection from the remote host name.
    pub platform: Option<Platform>,

    /// Only include history between `HEAD` and this commit.
    pub starting_commit: Option<String>,

    /// Additional branches to include commits from.
    pub include_branch: Vec<String>,

    /// Maximum number of merge commits unfolded concurrently.
    pub unfold_concurrency: usize,

    /// The hosting remote; without one no links are generated.
    pub remote: Option<Remote>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tag_prefix: String::new(),
            tag_pattern: None,
            issue_pattern: None,
            issue_url: None,
            merge_pattern: None,
            breaking_pattern: None,
            ignore_commit_pattern: None,
            replace_text: Vec::new(),
            platform: None,
            starting_commit: None,
            include_branch: Vec::new(),
            unfold_concurrency: DEFAULT_UNFOLD_CONCURRENCY,
            remote: None,
        }
    }
}

impl Options {
    /// Checks values that serde cannot validate on its own.
    ///
    /// Patterns are validated when they are compiled.
    ///
    /// # Errors
    ///
    /// Returns an error if `unfold-concurrency` is zero.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.unfold_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "unfold-concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A single text replacement rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceRule {
    /// The pattern to search for.
    pub pattern: String,

    /// The replacement; `$1` and `${1}` refer to capture groups.
    pub replacement: String,
}

impl ReplaceRule {
    /// Creates a new replacement rule.
    #[must_use]
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// A hosting platform with its own link conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// GitHub and anything without a more specific convention.
    Github,
    /// GitLab, hosted or self-managed.
    Gitlab,
    /// Bitbucket.
    Bitbucket,
    /// Azure DevOps.
    Azure,
    /// Legacy Visual Studio Online.
    VisualStudio,
}

impl Platform {
    /// Returns the configuration name of the platform.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::Bitbucket => "bitbucket",
            Self::Azure => "azure",
            Self::VisualStudio => "visualstudio",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(Self::Github),
            "gitlab" => Ok(Self::Gitlab),
            "bitbucket" => Ok(Self::Bitbucket),
            "azure" => Ok(Self::Azure),
            "visualstudio" => Ok(Self::VisualStudio),
            _ => Err(ConfigError::InvalidPlatform(s.to_string())),
        }
    }
}
