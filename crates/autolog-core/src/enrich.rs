//! Turns raw commits into enriched commits.

use autolog_commit::{Commit, RawCommit, Remote};

use crate::{CompiledOptions, Links, Replacement, extract_fixes, extract_merge, resolve_tag};

/// Applies every replacement in order.
#[must_use]
pub fn replace_text(text: &str, replacements: &[Replacement]) -> String {
    replacements
        .iter()
        .fold(text.to_string(), |text, replacement| replacement.apply(&text))
}

/// Returns true if the breaking change pattern is configured and matches.
#[must_use]
pub fn is_breaking(message: &str, options: &CompiledOptions) -> bool {
    options
        .breaking_pattern()
        .is_some_and(|pattern| pattern.is_match(message))
}

/// Resolves tag, fixes, merge, breaking flag and links for one commit.
///
/// Without a remote no links are built anywhere.
#[must_use]
pub fn enrich(raw: &RawCommit, remote: Option<&Remote>, options: &CompiledOptions) -> Commit {
    let links = remote.map(|remote| Links::resolve(remote, options.platform()));
    let links = links.as_ref();

    Commit::builder(raw)
        .tag(resolve_tag(
            raw.refs.as_deref(),
            options.tag_prefix(),
            options.tag_pattern(),
        ))
        .subject(replace_text(raw.subject(), options.replacements()))
        .fixes(extract_fixes(
            &raw.message,
            &raw.author,
            options.fix_rule(),
            options.issue_url(),
            links,
        ))
        .merge(extract_merge(
            &raw.message,
            &raw.author,
            options.merge_rules(),
            options.replacements(),
            links,
        ))
        .href(links.map(|links| links.commit(&raw.hash)))
        .breaking(is_breaking(&raw.message, options))
        .build()
}
