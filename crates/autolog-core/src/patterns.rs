//! Compiled options and the built-in pattern tables.

use std::sync::LazyLock;

use autolog_config::{ConfigError, ConfigResult, Options, Platform};
use regex::Regex;

/// Closing keywords followed by `#<id>` or an issue / pull request URL.
///
/// See <https://help.github.com/articles/closing-issues-via-commit-messages>.
const DEFAULT_FIX_PATTERN: &str = r"(?i)(?:close[sd]?|fixe?[sd]?|resolve[sd]?)\s(?:#([0-9]+)|(https?://.+?/(?:issues|pull|pull-requests|merge_requests)/([0-9]+)))";

/// Built-in merge patterns, in priority order.
const DEFAULT_MERGE_PATTERNS: [(&str, &str); 4] = [
    ("github", r"Merge pull request #([0-9]+) from .+\n\n(.+)"),
    ("github-squash", r"^(.+) \(#([0-9]+)\)(?:$|\n\n)"),
    ("bitbucket", r"Merged in .+ \(pull request #([0-9]+)\)\n\n(.+)"),
    (
        "gitlab",
        r"Merge branch .+ into .+\n\n(.+)[\S\s]+See merge request [^!]*!([0-9]+)",
    ),
];

static DEFAULT_FIX_RULE: LazyLock<FixRule> = LazyLock::new(|| FixRule {
    regex: Regex::new(DEFAULT_FIX_PATTERN).expect("invalid regex"),
});

static DEFAULT_MERGE_RULES: LazyLock<Vec<MergeRule>> = LazyLock::new(|| {
    DEFAULT_MERGE_PATTERNS
        .iter()
        .map(|&(name, pattern)| MergeRule {
            name,
            regex: Regex::new(pattern).expect("invalid regex"),
        })
        .collect()
});

/// Recognises closed issues. The issue id is the last non-empty capture.
#[derive(Debug, Clone)]
pub struct FixRule {
    regex: Regex,
}

impl FixRule {
    /// Returns the pattern.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Recognises a merge commit; one of the first two captures is the numeric
/// id and the other the title.
#[derive(Debug, Clone)]
pub struct MergeRule {
    name: &'static str,
    regex: Regex,
}

impl MergeRule {
    /// Returns the rule name (`custom` for a configured pattern).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the pattern.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// A compiled text replacement.
#[derive(Debug, Clone)]
pub struct Replacement {
    regex: Regex,
    replacement: String,
}

impl Replacement {
    /// Applies the replacement to every match in `text`.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        self.regex
            .replace_all(text, self.replacement.as_str())
            .into_owned()
    }
}

/// [`Options`] with every pattern compiled once.
#[derive(Debug, Clone)]
pub struct CompiledOptions {
    tag_prefix: String,
    tag_pattern: Option<Regex>,
    fix_rule: FixRule,
    issue_url: Option<String>,
    merge_rules: Vec<MergeRule>,
    breaking_pattern: Option<Regex>,
    ignore_commit_pattern: Option<Regex>,
    replacements: Vec<Replacement>,
    platform: Option<Platform>,
    starting_commit: Option<String>,
    include_branch: Vec<String>,
    unfold_concurrency: usize,
}

impl CompiledOptions {
    /// Validates the options and compiles their patterns.
    ///
    /// A configured issue or merge pattern replaces the built-in ones.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] naming the first option whose
    /// pattern does not compile, or [`ConfigError::Invalid`] for other
    /// invalid values.
    pub fn compile(options: &Options) -> ConfigResult<Self> {
        options.validate()?;

        let fix_rule = match &options.issue_pattern {
            Some(pattern) => FixRule {
                regex: compile("issue-pattern", pattern)?,
            },
            None => DEFAULT_FIX_RULE.clone(),
        };
        let merge_rules = match &options.merge_pattern {
            Some(pattern) => vec![MergeRule {
                name: "custom",
                regex: compile("merge-pattern", pattern)?,
            }],
            None => DEFAULT_MERGE_RULES.clone(),
        };
        let replacements = options
            .replace_text
            .iter()
            .map(|rule| {
                Ok(Replacement {
                    regex: compile("replace-text", &rule.pattern)?,
                    replacement: expand_group_refs(&rule.replacement),
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self {
            tag_prefix: options.tag_prefix.clone(),
            tag_pattern: compile_opt("tag-pattern", options.tag_pattern.as_deref())?,
            fix_rule,
            issue_url: options.issue_url.clone(),
            merge_rules,
            breaking_pattern: compile_opt("breaking-pattern", options.breaking_pattern.as_deref())?,
            ignore_commit_pattern: compile_opt(
                "ignore-commit-pattern",
                options.ignore_commit_pattern.as_deref(),
            )?,
            replacements,
            platform: options.platform,
            starting_commit: options.starting_commit.clone(),
            include_branch: options.include_branch.clone(),
            unfold_concurrency: options.unfold_concurrency,
        })
    }

    /// Tag prefix.
    #[must_use]
    pub fn tag_prefix(&self) -> &str {
        &self.tag_prefix
    }

    /// Custom tag pattern.
    #[must_use]
    pub fn tag_pattern(&self) -> Option<&Regex> {
        self.tag_pattern.as_ref()
    }

    /// Issue rule in effect.
    #[must_use]
    pub fn fix_rule(&self) -> &FixRule {
        &self.fix_rule
    }

    /// Issue link template.
    #[must_use]
    pub fn issue_url(&self) -> Option<&str> {
        self.issue_url.as_deref()
    }

    /// Merge rules in priority order.
    #[must_use]
    pub fn merge_rules(&self) -> &[MergeRule] {
        &self.merge_rules
    }

    /// Breaking change pattern.
    #[must_use]
    pub fn breaking_pattern(&self) -> Option<&Regex> {
        self.breaking_pattern.as_ref()
    }

    /// Pattern of subjects to drop.
    #[must_use]
    pub fn ignore_commit_pattern(&self) -> Option<&Regex> {
        self.ignore_commit_pattern.as_ref()
    }

    /// Text replacements, in application order.
    #[must_use]
    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    /// Explicit hosting platform.
    #[must_use]
    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    /// Starting commit bounding the top-level query.
    #[must_use]
    pub fn starting_commit(&self) -> Option<&str> {
        self.starting_commit.as_deref()
    }

    /// Additional branches to fetch.
    #[must_use]
    pub fn include_branch(&self) -> &[String] {
        &self.include_branch
    }

    /// Maximum number of concurrent unfolding queries.
    #[must_use]
    pub fn unfold_concurrency(&self) -> usize {
        self.unfold_concurrency
    }
}

fn compile(option: &'static str, pattern: &str) -> ConfigResult<Regex> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern { option, source })
}

fn compile_opt(option: &'static str, pattern: Option<&str>) -> ConfigResult<Option<Regex>> {
    pattern.map(|p| compile(option, p)).transpose()
}

/// Rewrites `$1`-style group references as `${1}`.
///
/// The regex crate reads `$1_` as a group named `1_`; braces keep the digits
/// apart from whatever follows. `$$` stays a literal dollar sign.
fn expand_group_refs(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push_str("$$");
            }
            Some('&') => {
                chars.next();
                out.push_str("${0}");
            }
            Some(d) if d.is_ascii_digit() => {
                out.push_str("${");
                while let Some(d) = chars.next_if(char::is_ascii_digit) {
                    out.push(d);
                }
                out.push('}');
            }
            _ => out.push('$'),
        }
    }
    out
}
