//! Hosting remote descriptor.

use serde::{Deserialize, Serialize};

/// The hosting remote of a repository, used to build hyperlinks.
///
/// `url` points at the repository itself (e.g. `https://github.com/user/repo`).
/// `project_url` is only set for Azure DevOps and Visual Studio Online, whose
/// work items live at the project level rather than the repository level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Remote {
    /// Host name, e.g. `github.com`.
    pub hostname: String,

    /// Repository URL without a trailing slash.
    pub url: String,

    /// Project URL, for platforms that have one.
    #[serde(default)]
    pub project_url: Option<String>,
}

impl Remote {
    /// Creates a remote without a project URL.
    #[must_use]
    pub fn new(hostname: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            url: url.into(),
            project_url: None,
        }
    }

    /// Sets the project URL.
    #[must_use]
    pub fn with_project_url(mut self, project_url: impl Into<String>) -> Self {
        self.project_url = Some(project_url.into());
        self
    }
}
