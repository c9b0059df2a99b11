//! Log format negotiation.
//!
//! The sentinels below are part of the log protocol: records produced with one
//! set of values cannot be read with another.

use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

/// Marks the start of every record.
pub const COMMIT_SEPARATOR: &str = "__AUTO_CHANGELOG_COMMIT_SEPARATOR__";

/// Marks the end of the message inside a record.
pub const MESSAGE_SEPARATOR: &str = "__AUTO_CHANGELOG_MESSAGE_SEPARATOR__";

/// Raw body placeholder, available since git 1.7.2.
pub const BODY_FORMAT: &str = "%B";

/// Subject and body placeholders for older git versions.
pub const FALLBACK_BODY_FORMAT: &str = "%s%n%n%b";

const MIN_BODY_FORMAT_VERSION: Version = Version::new(1, 7, 2);

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+").expect("invalid regex"));

/// Extracts the version number from `git --version` output.
pub fn parse_git_version(output: &str) -> Option<String> {
    VERSION_RE.find(output).map(|m| m.as_str().to_string())
}

/// The `--pretty=format:` template used for every log query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFormat {
    template: String,
}

impl LogFormat {
    /// Picks the body placeholder for the detected git version.
    ///
    /// Unknown or unparsable versions get the fallback placeholder.
    #[must_use]
    pub fn for_version(version: Option<&str>) -> Self {
        let modern = version
            .and_then(|v| Version::parse(v).ok())
            .is_some_and(|v| v >= MIN_BODY_FORMAT_VERSION);
        let body = if modern {
            BODY_FORMAT
        } else {
            FALLBACK_BODY_FORMAT
        };

        Self {
            template: format!("{COMMIT_SEPARATOR}%H%n%d%n%ai%n%an%n%ae%n{body}{MESSAGE_SEPARATOR}"),
        }
    }

    /// Returns the template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }
}
