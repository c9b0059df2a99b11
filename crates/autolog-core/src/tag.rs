//! Release tag resolution from ref decorations.

use regex::Regex;
use semver::Version;

/// Resolves the release tag from a ref decoration list such as
/// `HEAD -> master, tag: v1.0.0, origin/master`.
///
/// Entries are checked in order for `tag: <prefix>`. With a tag pattern the
/// first tag entry decides the result; otherwise the first entry holding a
/// semantic version (an optional leading `v` is accepted) wins. The
/// returned tag has the prefix removed.
#[must_use]
pub fn resolve_tag(refs: Option<&str>, prefix: &str, pattern: Option<&Regex>) -> Option<String> {
    let marker = format!("tag: {prefix}");

    for entry in refs?.split(", ") {
        let Some(candidate) = entry.strip_prefix(marker.as_str()) else {
            continue;
        };
        match pattern {
            Some(pattern) => {
                return pattern.is_match(candidate).then(|| candidate.to_string());
            }
            None if is_semver(candidate) => return Some(candidate.to_string()),
            None => {}
        }
    }
    None
}

fn is_semver(candidate: &str) -> bool {
    let version = candidate.strip_prefix('v').unwrap_or(candidate);
    Version::parse(version.trim()).is_ok()
}
