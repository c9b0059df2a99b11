//! Commit history extraction.

use std::collections::HashSet;
use std::sync::Arc;

use autolog_commit::{Commit, RawCommit, Remote};
use autolog_config::Options;
use autolog_git::{GitCommand, GitError, GitResult, LogFormat, LogSource, Progress, parse_log};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{CompiledOptions, CoreError, CoreResult, enrich, filter_ignored};

/// Fetches, unfolds, enriches and filters the commit history.
pub struct Engine {
    source: Arc<dyn LogSource>,
    remote: Option<Remote>,
    options: Arc<CompiledOptions>,
}

impl Engine {
    /// Creates an engine, compiling the option patterns once.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a pattern does not compile.
    pub fn new(
        source: Arc<dyn LogSource>,
        remote: Option<Remote>,
        options: &Options,
    ) -> CoreResult<Self> {
        Ok(Self {
            source,
            remote,
            options: Arc::new(CompiledOptions::compile(options)?),
        })
    }

    /// Returns the compiled options.
    #[must_use]
    pub fn options(&self) -> &CompiledOptions {
        &self.options
    }

    /// Fetches the commits merged into `branch` (or `HEAD`).
    ///
    /// Each top-level merge is followed by the commits it brought in, in log
    /// order. `on_progress` receives the byte count of the top-level query.
    ///
    /// # Errors
    ///
    /// Fails as a whole if git cannot be run, if any record is malformed, or
    /// if git rejects the range of a configured starting commit.
    pub async fn fetch_commits(
        &self,
        branch: Option<&str>,
        on_progress: Option<&Progress>,
        cancel: &CancellationToken,
    ) -> CoreResult<Vec<Commit>> {
        let format = self.source.log_format(cancel).await?;
        let starting_commit = self.options.starting_commit();

        let command = GitCommand::merges(branch, starting_commit).with_format(&format);
        let output = self.source.run(&command, on_progress, cancel).await?;
        let merges = parse_log(&output.stdout)?;

        // Only a range git rejected is an error; a valid one may hold no merges.
        if let Some(starting_commit) = starting_commit
            && merges.is_empty()
            && !output.success
        {
            return Err(GitError::malformed(
                format!("no commits found from starting commit `{starting_commit}`"),
                &output.stdout,
            )
            .into());
        }
        debug!(merges = merges.len(), "fetched top-level merges");

        let raw = self.unfold(merges, &format, cancel).await?;
        let commits: Vec<Commit> = raw
            .iter()
            .map(|raw| enrich(raw, self.remote.as_ref(), &self.options))
            .collect();

        let total = commits.len();
        let commits = filter_ignored(commits, self.options.ignore_commit_pattern());
        info!(total, kept = commits.len(), "fetched commits");
        Ok(commits)
    }

    /// Fetches the current branch, then every included branch.
    ///
    /// Commits already seen on an earlier branch are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first error of any branch fetch.
    pub async fn fetch_all_commits(
        &self,
        on_progress: Option<&Progress>,
        cancel: &CancellationToken,
    ) -> CoreResult<Vec<Commit>> {
        let mut commits = self.fetch_commits(None, on_progress, cancel).await?;
        let mut seen: HashSet<String> = commits.iter().map(|c| c.hash.clone()).collect();

        for branch in self.options.include_branch() {
            let extra = self.fetch_commits(Some(branch), on_progress, cancel).await?;
            debug!(branch = branch.as_str(), commits = extra.len(), "fetched included branch");
            commits.extend(extra.into_iter().filter(|c| seen.insert(c.hash.clone())));
        }
        Ok(commits)
    }

    /// Expands every merge into itself followed by its non-merge commits.
    ///
    /// At most `unfold_concurrency` queries run at once. Results are
    /// collected in merge order whatever the completion order. The first
    /// failure cancels the remaining queries.
    async fn unfold(
        &self,
        merges: Vec<RawCommit>,
        format: &LogFormat,
        cancel: &CancellationToken,
    ) -> CoreResult<Vec<RawCommit>> {
        let semaphore = Arc::new(Semaphore::new(self.options.unfold_concurrency()));
        let cancel = cancel.child_token();
        let mut handles = Vec::with_capacity(merges.len());

        for merge in merges {
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => {
                    permit.map_err(|e| CoreError::Unfold(e.to_string()))?
                }
            };
            let source = Arc::clone(&self.source);
            let format = format.clone();
            let cancel = cancel.clone();

            let handle = tokio::spawn(async move {
                let result = unfold_merge(source.as_ref(), merge, &format, &cancel).await;
                drop(permit);
                if result.is_err() {
                    cancel.cancel();
                }
                result
            });
            handles.push(handle);
        }

        let mut commits = Vec::new();
        let mut failure: Option<CoreError> = None;
        for handle in handles {
            let error = match handle.await {
                Ok(Ok(unfolded)) => {
                    commits.extend(unfolded);
                    continue;
                }
                Ok(Err(err)) => CoreError::from(err),
                Err(err) => {
                    cancel.cancel();
                    CoreError::Unfold(err.to_string())
                }
            };
            // Keep the error that caused the cancellation, not its echoes.
            if failure.as_ref().is_none_or(is_cancellation) {
                failure = Some(error);
            }
        }

        match failure {
            Some(err) => Err(err),
            None if cancel.is_cancelled() => Err(GitError::Cancelled {
                command: "git log".to_string(),
            }
            .into()),
            None => Ok(commits),
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("remote", &self.remote)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

async fn unfold_merge(
    source: &dyn LogSource,
    merge: RawCommit,
    format: &LogFormat,
    cancel: &CancellationToken,
) -> GitResult<Vec<RawCommit>> {
    let command = GitCommand::unfold(&merge.hash).with_format(format);
    let output = source.run(&command, None, cancel).await?;
    let children = parse_log(&output.stdout)?;
    debug!(merge = merge.short_hash(), children = children.len(), "unfolded merge");

    let mut unfolded = Vec::with_capacity(children.len() + 1);
    unfolded.push(merge);
    unfolded.extend(children);
    Ok(unfolded)
}

fn is_cancellation(err: &CoreError) -> bool {
    matches!(err, CoreError::Git(GitError::Cancelled { .. }))
}

/// Formats a byte count for progress output, e.g. `12 kB`.
///
/// Never reports less than `1 kB`.
#[must_use]
pub fn format_bytes(bytes: usize) -> String {
    let kilobytes = bytes.saturating_add(512) / 1024;
    format!("{} kB", kilobytes.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::tests::github;
    use async_trait::async_trait;
    use autolog_config::ReplaceRule;
    use autolog_git::{COMMIT_SEPARATOR, LogOutput, MESSAGE_SEPARATOR};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replies to each command from a script, optionally after a delay.
    #[derive(Default)]
    struct ScriptedSource {
        version: String,
        replies: Vec<(String, String, u64)>,
        rejected: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self {
                version: "git version 2.39.2\n".to_string(),
                ..Self::default()
            }
        }

        fn reply(mut self, args_prefix: &str, output: String) -> Self {
            self.replies.push((args_prefix.to_string(), output, 0));
            self
        }

        fn delayed_reply(mut self, args_prefix: &str, output: String, delay_ms: u64) -> Self {
            self.replies.push((args_prefix.to_string(), output, delay_ms));
            self
        }

        /// Makes git exit unsuccessfully for commands with this prefix.
        fn reject(mut self, args_prefix: &str) -> Self {
            self.rejected.push(args_prefix.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LogSource for ScriptedSource {
        async fn run(
            &self,
            command: &GitCommand,
            progress: Option<&Progress>,
            cancel: &CancellationToken,
        ) -> GitResult<LogOutput> {
            let args = command.args().join(" ");
            self.calls.lock().unwrap().push(args.clone());
            if args == "--version" {
                return Ok(LogOutput::new(self.version.as_str()));
            }

            // Longest matching prefix wins.
            let (output, delay) = self
                .replies
                .iter()
                .filter(|(prefix, ..)| args.starts_with(prefix.as_str()))
                .max_by_key(|(prefix, ..)| prefix.len())
                .map(|(_, output, delay)| (output.clone(), *delay))
                .unwrap_or_default();

            tokio::select! {
                () = cancel.cancelled() => {
                    return Err(GitError::Cancelled { command: command.to_string() });
                }
                () = tokio::time::sleep(Duration::from_millis(delay)) => {}
            }
            if let Some(progress) = progress {
                progress(output.len());
            }
            if self.rejected.iter().any(|prefix| args.starts_with(prefix.as_str())) {
                return Ok(LogOutput::failed(output));
            }
            Ok(LogOutput::new(output))
        }
    }

    /// Fails every command.
    struct BrokenSource;

    #[async_trait]
    impl LogSource for BrokenSource {
        async fn run(
            &self,
            command: &GitCommand,
            _progress: Option<&Progress>,
            _cancel: &CancellationToken,
        ) -> GitResult<LogOutput> {
            Err(GitError::Process {
                command: command.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "git not found"),
            })
        }
    }

    fn record(hash: &str, refs: &str, message: &str) -> String {
        let refs = if refs.is_empty() {
            String::new()
        } else {
            format!(" ({refs})")
        };
        format!(
            "{COMMIT_SEPARATOR}{hash}\n{refs}\n2015-12-01 15:33:33 +0000\nPete Cook\npete@example.com\n{message}{MESSAGE_SEPARATOR}\n 1 file changed, 2 insertions(+)\n"
        )
    }

    fn build_engine(source: ScriptedSource, options: &Options) -> (Arc<ScriptedSource>, Engine) {
        let source = Arc::new(source);
        let remote = Some(github());
        let engine = Engine::new(source.clone(), remote, options).unwrap();
        (source, engine)
    }

    fn hashes(commits: &[Commit]) -> Vec<&str> {
        commits.iter().map(|c| c.hash.as_str()).collect()
    }

    #[tokio::test]
    async fn test_unfolds_merges_in_order() {
        let top = [
            record("m1", "tag: v2.0.0", "Merge pull request #2 from a/b\n\nSecond"),
            record("m2", "", "Merge pull request #1 from a/c\n\nFirst"),
        ]
        .concat();
        let source = ScriptedSource::new()
            .reply("log --merges", top)
            .reply(
                "log m1^..m1",
                [record("c1", "", "Two"), record("c2", "", "Fixes #9")].concat(),
            )
            .reply("log m2^..m2", record("c3", "", "One"));
        let (source, engine) = build_engine(source, &Options::default());

        let commits = engine
            .fetch_commits(None, None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(hashes(&commits), ["m1", "c1", "c2", "m2", "c3"]);
        assert_eq!(commits[0].tag.as_deref(), Some("v2.0.0"));
        assert_eq!(commits[0].merge.as_ref().unwrap().message, "Second");
        assert_eq!(commits[2].fixes.as_ref().unwrap()[0].id, "9");
        assert_eq!(commits[1].stats.files, 1);
        assert_eq!(commits[1].stats.insertions, 2);

        let calls = source.calls();
        assert_eq!(calls[0], "--version");
        assert!(calls[1].starts_with("log --merges --first-parent --shortstat --pretty=format:"));
        assert!(calls[1].contains("%B"));
    }

    #[tokio::test]
    async fn test_order_is_independent_of_completion_timing() {
        let top: String = (0..6).map(|i| record(&format!("m{i}"), "", "Merge")).collect();
        let mut source = ScriptedSource::new().reply("log --merges", top);
        for i in 0..6 {
            // Earlier merges answer last.
            source = source.delayed_reply(
                &format!("log m{i}^..m{i}"),
                [record(&format!("c{i}a"), "", "A"), record(&format!("c{i}b"), "", "B")].concat(),
                60 - i * 10,
            );
        }
        let options = Options {
            unfold_concurrency: 3,
            ..Options::default()
        };
        let (_, engine) = build_engine(source, &options);

        let commits = engine
            .fetch_commits(None, None, &CancellationToken::new())
            .await
            .unwrap();

        let expected: Vec<String> = (0..6)
            .flat_map(|i| [format!("m{i}"), format!("c{i}a"), format!("c{i}b")])
            .collect();
        assert_eq!(hashes(&commits), expected);
    }

    #[tokio::test]
    async fn test_branch_and_starting_commit_commands() {
        let source = ScriptedSource::new().reply("log", record("m1", "", "Merge"));
        let (source, engine) = build_engine(source, &Options::default());
        engine
            .fetch_commits(Some("develop"), None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(source.calls()[1].starts_with("log --merges --first-parent develop --shortstat"));

        let source = ScriptedSource::new().reply("log", record("m1", "", "Merge"));
        let options = Options {
            starting_commit: Some("abc123".to_string()),
            ..Options::default()
        };
        let (source, engine) = build_engine(source, &options);
        engine
            .fetch_commits(Some("develop"), None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(source.calls()[1].starts_with("log HEAD...abc123 --merges --first-parent --shortstat"));
    }

    #[tokio::test]
    async fn test_fallback_format_for_old_git() {
        let mut source = ScriptedSource::new().reply("log", String::new());
        source.version = "git version 1.7.1\n".to_string();
        let (source, engine) = build_engine(source, &Options::default());

        let commits = engine
            .fetch_commits(None, None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(commits.is_empty());
        assert!(source.calls()[1].contains("%s%n%n%b"));
    }

    #[tokio::test]
    async fn test_rejected_starting_commit_is_malformed() {
        let source = ScriptedSource::new()
            .reply("log", String::new())
            .reject("log HEAD...not-a-commit");
        let options = Options {
            starting_commit: Some("not-a-commit".to_string()),
            ..Options::default()
        };
        let (_, engine) = build_engine(source, &options);

        let err = engine
            .fetch_commits(None, None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_malformed_record());
    }

    #[tokio::test]
    async fn test_valid_starting_commit_without_merges_is_empty() {
        let source = ScriptedSource::new().reply("log", String::new());
        let options = Options {
            starting_commit: Some("abc123".to_string()),
            ..Options::default()
        };
        let (source, engine) = build_engine(source, &options);

        let commits = engine
            .fetch_commits(None, None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(commits.is_empty());
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_query_without_starting_commit_is_empty() {
        let source = ScriptedSource::new()
            .reply("log", String::new())
            .reject("log --merges");
        let (_, engine) = build_engine(source, &Options::default());

        let commits = engine
            .fetch_commits(None, None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(commits.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_child_fails_whole_fetch() {
        let top = [record("m1", "", "Merge"), record("m2", "", "Merge")].concat();
        let source = ScriptedSource::new()
            .reply("log --merges", top)
            .reply("log m1^..m1", record("c1", "", "Fine"))
            .reply("log m2^..m2", format!("{COMMIT_SEPARATOR}garbage"));
        let (_, engine) = build_engine(source, &Options::default());

        let err = engine
            .fetch_commits(None, None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_malformed_record());
    }

    #[tokio::test]
    async fn test_failure_cancels_slow_queries() {
        let top = [record("m1", "", "Merge"), record("m2", "", "Merge")].concat();
        let source = ScriptedSource::new()
            .reply("log --merges", top)
            .delayed_reply("log m1^..m1", record("c1", "", "Slow"), 10_000)
            .reply("log m2^..m2", "garbage".to_string() + COMMIT_SEPARATOR + "x");
        let (_, engine) = build_engine(source, &Options::default());

        let err = tokio::time::timeout(
            Duration::from_secs(5),
            engine.fetch_commits(None, None, &CancellationToken::new()),
        )
        .await
        .unwrap()
        .unwrap_err();
        assert!(err.is_malformed_record());
    }

    #[tokio::test]
    async fn test_process_error_is_surfaced() {
        let engine = Engine::new(Arc::new(BrokenSource), None, &Options::default()).unwrap();
        let err = engine
            .fetch_commits(None, None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_process());
    }

    #[tokio::test]
    async fn test_cancelled_fetch() {
        let source = ScriptedSource::new().delayed_reply("log", String::new(), 10_000);
        let (_, engine) = build_engine(source, &Options::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = engine.fetch_commits(None, None, &cancel).await.unwrap_err();
        assert!(matches!(err, CoreError::Git(GitError::Cancelled { .. })));
    }

    #[tokio::test]
    async fn test_ignore_pattern_and_replacements() {
        let top = record("m1", "", "Merge pull request #4 from a/b\n\nRelease");
        let source = ScriptedSource::new().reply("log --merges", top).reply(
            "log m1^..m1",
            [record("c1", "", "chore: tidy"), record("c2", "", "Add thing")].concat(),
        );
        let options = Options {
            ignore_commit_pattern: Some("^chore".to_string()),
            replace_text: vec![ReplaceRule::new("thing", "widget")],
            ..Options::default()
        };
        let (_, engine) = build_engine(source, &options);

        let commits = engine
            .fetch_commits(None, None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(hashes(&commits), ["m1", "c2"]);
        assert_eq!(commits[1].subject, "Add widget");
        assert_eq!(commits[1].message, "Add thing");
    }

    #[tokio::test]
    async fn test_progress_reports_top_level_bytes() {
        let top = record("m1", "", "Merge");
        let len = top.len();
        let source = ScriptedSource::new()
            .reply("log --merges", top)
            .reply("log m1^..m1", String::new());
        let (_, engine) = build_engine(source, &Options::default());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = move |bytes: usize| sink.lock().unwrap().push(bytes);

        engine
            .fetch_commits(None, Some(&progress), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), [len]);
    }

    #[tokio::test]
    async fn test_fetch_all_commits_skips_seen_hashes() {
        let source = ScriptedSource::new()
            .reply(
                "log --merges --first-parent develop",
                [record("m9", "", "Merge"), record("m1", "", "Merge")].concat(),
            )
            .reply("log --merges", record("m1", "", "Merge"))
            .reply("log m1^..m1", record("c1", "", "One"))
            .reply("log m9^..m9", [record("c9", "", "Nine"), record("c1", "", "One")].concat());
        let options = Options {
            include_branch: vec!["develop".to_string()],
            ..Options::default()
        };
        let (_, engine) = build_engine(source, &options);

        let commits = engine
            .fetch_all_commits(None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(hashes(&commits), ["m1", "c1", "m9", "c9"]);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = Options {
            issue_pattern: Some("(".to_string()),
            ..Options::default()
        };
        let err = Engine::new(Arc::new(BrokenSource), None, &options).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "1 kB");
        assert_eq!(format_bytes(100), "1 kB");
        assert_eq!(format_bytes(1536), "2 kB");
        assert_eq!(format_bytes(10 * 1024), "10 kB");
        assert_eq!(format_bytes(usize::MAX), format!("{} kB", usize::MAX / 1024));
    }
}
