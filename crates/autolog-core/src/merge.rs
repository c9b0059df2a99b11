//! Merge request metadata extraction.

use autolog_commit::Merge;

use crate::{Links, MergeRule, Replacement, replace_text};

/// Tries each rule in order and describes the first match.
///
/// Group 1 is the id when it is all digits and group 2 is the title;
/// otherwise the roles are swapped. Replacements are applied to the title.
#[must_use]
pub fn extract_merge(
    message: &str,
    author: &str,
    rules: &[MergeRule],
    replacements: &[Replacement],
    links: Option<&Links<'_>>,
) -> Option<Merge> {
    rules.iter().find_map(|rule| {
        let captures = rule.regex().captures(message)?;
        let group = |i: usize| captures.get(i).map_or("", |m| m.as_str());

        let (id, title) = if is_numeric(group(1)) {
            (group(1), group(2))
        } else {
            (group(2), group(1))
        };
        tracing::trace!(rule = rule.name(), id, "merge pattern matched");

        Some(Merge {
            id: id.to_string(),
            message: replace_text(title, replacements),
            href: links.map(|links| links.merge(id)),
            author: author.to_string(),
        })
    })
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
