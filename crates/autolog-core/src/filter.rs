//! Commit filter.

use autolog_commit::Commit;
use regex::Regex;

/// Drops every commit whose subject matches `pattern`.
#[must_use]
pub fn filter_ignored(commits: Vec<Commit>, pattern: Option<&Regex>) -> Vec<Commit> {
    let Some(pattern) = pattern else {
        return commits;
    };
    commits
        .into_iter()
        .filter(|commit| !pattern.is_match(&commit.subject))
        .collect()
}
