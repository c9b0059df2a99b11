//! Record tokenizer and commit field parser.

use std::sync::LazyLock;

use autolog_commit::{DiffStats, RawCommit};
use chrono::{DateTime, Utc};
use regex::Regex;

use crate::{COMMIT_SEPARATOR, GitError, GitResult, MESSAGE_SEPARATOR};

/// Hash, optional ` (refs)`, author date, author name, author email, tail.
static RECORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(.*)\n(?:\s\((.*)\))?\n(.*)\n(.*)\n(.*)\n([\S\s]+)").expect("invalid regex")
});

static STATS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+) files? changed(?:, (\d+) insertions?...)?(?:, (\d+) deletions?...)?")
        .expect("invalid regex")
});

/// Format of the `%ai` placeholder, e.g. `2015-12-01 15:33:33 +0000`.
const AUTHOR_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Splits log text into one block per record.
///
/// Whatever precedes the first separator is never record data and is skipped.
pub fn split_records(log: &str) -> impl Iterator<Item = &str> {
    log.split(COMMIT_SEPARATOR).skip(1)
}

/// Parses every record of a log, failing on the first malformed one.
///
/// # Errors
///
/// Returns [`GitError::MalformedRecord`] if any block does not have the
/// expected shape.
pub fn parse_log(log: &str) -> GitResult<Vec<RawCommit>> {
    split_records(log).map(parse_record).collect()
}

/// Parses one record block (without its leading separator).
///
/// # Errors
///
/// Returns [`GitError::MalformedRecord`] if the block does not have the
/// expected fields or the author date cannot be parsed.
pub fn parse_record(block: &str) -> GitResult<RawCommit> {
    let captures = RECORD_RE
        .captures(block)
        .ok_or_else(|| GitError::malformed("expected hash, refs, date, author and email", block))?;

    let field = |i: usize| captures.get(i).map_or("", |m| m.as_str());
    let date = parse_date(field(3)).ok_or_else(|| GitError::malformed("invalid author date", block))?;

    let (message, stats) = match field(6).split_once(MESSAGE_SEPARATOR) {
        Some((message, stats)) => (message, parse_stats(stats)),
        None => (field(6), DiffStats::default()),
    };

    let mut commit = RawCommit::new(field(1), message, field(4), field(5), date).with_stats(stats);
    if let Some(refs) = captures.get(2) {
        commit = commit.with_refs(refs.as_str());
    }
    Ok(commit)
}

/// Parses a `--shortstat` line. Missing counts, or a missing line, are zero.
pub fn parse_stats(line: &str) -> DiffStats {
    let Some(captures) = STATS_RE.captures(line.trim()) else {
        return DiffStats::default();
    };
    let count = |i: usize| {
        captures
            .get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    DiffStats {
        files: count(1),
        insertions: count(2),
        deletions: count(3),
    }
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value.trim(), AUTHOR_DATE_FORMAT)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
