//! Enriched commit type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DiffStats, RawCommit};

/// An issue or pull request closed by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    /// The issue identifier (e.g. `12` or `ABC-1234`).
    pub id: String,

    /// Link to the issue, when a remote is known.
    pub href: Option<String>,

    /// The author of the fixing commit.
    pub author: String,
}

/// The merge or pull request a commit belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merge {
    /// The numeric merge request identifier.
    pub id: String,

    /// The merge request title.
    pub message: String,

    /// Link to the merge request, when a remote is known.
    pub href: Option<String>,

    /// The author of the merge commit.
    pub author: String,
}

/// A commit enriched with tag, issue and merge metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// The commit hash (SHA).
    pub hash: String,

    /// The first 7 characters of `hash`.
    pub short_hash: String,

    /// The commit author name.
    pub author: String,

    /// The commit author email.
    pub email: String,

    /// The author date, in UTC.
    pub date: DateTime<Utc>,

    /// The release tag pointing at this commit, if any.
    pub tag: Option<String>,

    /// The first line of the message, after text replacement.
    pub subject: String,

    /// The trimmed commit message.
    pub message: String,

    /// Issues closed by this commit; never an empty list.
    pub fixes: Option<Vec<Fix>>,

    /// The merge request this commit describes.
    pub merge: Option<Merge>,

    /// Link to the commit on the hosting platform.
    pub href: Option<String>,

    /// Whether the commit is flagged as a breaking change.
    pub breaking: bool,

    /// Diff statistics.
    #[serde(flatten)]
    pub stats: DiffStats,
}

impl Commit {
    /// Creates a builder seeded from a raw commit.
    #[must_use]
    pub fn builder(raw: &RawCommit) -> CommitBuilder {
        CommitBuilder::new(raw)
    }
}

/// Builder for [`Commit`].
#[derive(Debug)]
pub struct CommitBuilder {
    hash: String,
    short_hash: String,
    author: String,
    email: String,
    date: DateTime<Utc>,
    tag: Option<String>,
    subject: String,
    message: String,
    fixes: Option<Vec<Fix>>,
    merge: Option<Merge>,
    href: Option<String>,
    breaking: bool,
    stats: DiffStats,
}

impl CommitBuilder {
    fn new(raw: &RawCommit) -> Self {
        Self {
            hash: raw.hash.clone(),
            short_hash: raw.short_hash().to_string(),
            author: raw.author.clone(),
            email: raw.email.clone(),
            date: raw.date,
            tag: None,
            subject: raw.subject().to_string(),
            message: raw.message.trim().to_string(),
            fixes: None,
            merge: None,
            href: None,
            breaking: false,
            stats: raw.stats,
        }
    }

    /// Sets the release tag.
    #[must_use]
    pub fn tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    /// Overrides the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the closed issues. An empty list is stored as `None`.
    #[must_use]
    pub fn fixes(mut self, fixes: Option<Vec<Fix>>) -> Self {
        self.fixes = fixes.filter(|f| !f.is_empty());
        self
    }

    /// Sets the merge request.
    #[must_use]
    pub fn merge(mut self, merge: Option<Merge>) -> Self {
        self.merge = merge;
        self
    }

    /// Sets the commit link.
    #[must_use]
    pub fn href(mut self, href: Option<String>) -> Self {
        self.href = href;
        self
    }

    /// Sets the breaking flag.
    #[must_use]
    pub fn breaking(mut self, breaking: bool) -> Self {
        self.breaking = breaking;
        self
    }

    /// Builds the [`Commit`].
    #[must_use]
    pub fn build(self) -> Commit {
        Commit {
            hash: self.hash,
            short_hash: self.short_hash,
            author: self.author,
            email: self.email,
            date: self.date,
            tag: self.tag,
            subject: self.subject,
            message: self.message,
            fixes: self.fixes,
            merge: self.merge,
            href: self.href,
            breaking: self.breaking,
            stats: self.stats,
        }
    }
}
