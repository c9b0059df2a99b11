//! Hosting platform link adapters.
//!
//! Adapters are tried in table order when no platform is configured, so a
//! host name containing both `gitlab` and `bitbucket` resolves to Bitbucket.

use autolog_commit::Remote;
use autolog_config::Platform;

struct Adapter {
    platform: Platform,
    host_marker: Option<&'static str>,
    commit_path: &'static str,
    merge_path: &'static str,
    project_work_items: bool,
}

static ADAPTERS: [Adapter; 5] = [
    Adapter {
        platform: Platform::Bitbucket,
        host_marker: Some("bitbucket"),
        commit_path: "commits",
        merge_path: "pull-requests",
        project_work_items: false,
    },
    Adapter {
        platform: Platform::Gitlab,
        host_marker: Some("gitlab"),
        commit_path: "commit",
        merge_path: "merge_requests",
        project_work_items: false,
    },
    Adapter {
        platform: Platform::Azure,
        host_marker: Some("dev.azure"),
        commit_path: "commit",
        merge_path: "pullrequest",
        project_work_items: true,
    },
    Adapter {
        platform: Platform::VisualStudio,
        host_marker: Some("visualstudio"),
        commit_path: "commit",
        merge_path: "pullrequest",
        project_work_items: true,
    },
    Adapter {
        platform: Platform::Github,
        host_marker: None,
        commit_path: "commit",
        merge_path: "pull",
        project_work_items: false,
    },
];

impl Adapter {
    fn matches_host(&self, hostname: &str) -> bool {
        self.host_marker.is_none_or(|marker| hostname.contains(marker))
    }
}

/// Builds commit, issue and merge request links for one remote.
#[derive(Clone, Copy)]
pub struct Links<'a> {
    remote: &'a Remote,
    adapter: &'static Adapter,
}

impl<'a> Links<'a> {
    /// Selects the adapter: the configured platform first, then the first
    /// adapter whose marker appears in the remote's host name.
    #[must_use]
    pub fn resolve(remote: &'a Remote, platform: Option<Platform>) -> Self {
        let adapter = match platform {
            Some(platform) => ADAPTERS.iter().find(|a| a.platform == platform),
            None => ADAPTERS.iter().find(|a| a.matches_host(&remote.hostname)),
        }
        .unwrap_or(&ADAPTERS[ADAPTERS.len() - 1]);

        Self { remote, adapter }
    }

    /// Returns the platform whose conventions are used.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.adapter.platform
    }

    /// Link to a commit.
    #[must_use]
    pub fn commit(&self, hash: &str) -> String {
        format!("{}/{}/{hash}", self.remote.url, self.adapter.commit_path)
    }

    /// Link to an issue or work item.
    #[must_use]
    pub fn issue(&self, id: &str) -> String {
        if self.adapter.project_work_items {
            let base = self.remote.project_url.as_deref().unwrap_or(&self.remote.url);
            format!("{base}/_workitems/edit/{id}")
        } else {
            format!("{}/issues/{id}", self.remote.url)
        }
    }

    /// Link to a merge or pull request.
    #[must_use]
    pub fn merge(&self, id: &str) -> String {
        format!("{}/{}/{id}", self.remote.url, self.adapter.merge_path)
    }
}

impl std::fmt::Debug for Links<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Links")
            .field("url", &self.remote.url)
            .field("platform", &self.adapter.platform)
            .finish()
    }
}
