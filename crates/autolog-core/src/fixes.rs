//! Issue reference extraction.

use autolog_commit::Fix;
use regex::Captures;

use crate::{FixRule, Links};

/// Returns the last non-empty capture, scanning down to the whole match.
///
/// A URL match fills both the URL group and its trailing id group, so the
/// scan prefers the embedded id over a bare `#id`. A pattern without groups
/// yields the whole match.
fn issue_id<'t>(captures: &Captures<'t>) -> &'t str {
    (0..captures.len())
        .rev()
        .filter_map(|i| captures.get(i))
        .map(|m| m.as_str())
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// Collects every issue the message closes, or `None` if there are none.
///
/// Links are only built when `links` is given: a URL match links to itself,
/// then `issue_url` (with `{id}` substituted) is used, then the platform's
/// issue link.
#[must_use]
pub fn extract_fixes(
    message: &str,
    author: &str,
    rule: &FixRule,
    issue_url: Option<&str>,
    links: Option<&Links<'_>>,
) -> Option<Vec<Fix>> {
    let fixes: Vec<Fix> = rule
        .regex()
        .captures_iter(message)
        .map(|captures| {
            let id = issue_id(&captures);
            let href = links.map(|links| match captures.get(2).map(|m| m.as_str()) {
                Some(url) if url.starts_with("http") => url.to_string(),
                _ => match issue_url {
                    Some(template) => template.replacen("{id}", id, 1),
                    None => links.issue(id),
                },
            });
            Fix {
                id: id.to_string(),
                href,
                author: author.to_string(),
            }
        })
        .collect();

    (!fixes.is_empty()).then_some(fixes)
}
