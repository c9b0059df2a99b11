//! External log source.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{GitCommand, GitError, GitResult, LogFormat, parse_git_version};

/// Progress callback, called with the number of bytes received so far.
pub type Progress = dyn Fn(usize) + Send + Sync;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Standard output of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOutput {
    /// Everything the command wrote to stdout.
    pub stdout: String,
    /// Whether the command exited successfully.
    pub success: bool,
}

impl LogOutput {
    /// Output of a command that exited successfully.
    #[must_use]
    pub fn new(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            success: true,
        }
    }

    /// Output of a command that exited with an error, such as git rejecting
    /// a revision.
    #[must_use]
    pub fn failed(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            success: false,
        }
    }
}

/// Something that can run a git command and return its standard output.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Runs the command and returns everything it wrote to stdout, along with
    /// its exit status.
    ///
    /// A non-zero exit is not an error: the stdout is still returned.
    /// `progress` is called zero or more times with the cumulative number of
    /// bytes received. Standard error is not captured.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::Process`] if the command cannot be run and
    /// [`GitError::Cancelled`] if `cancel` fires first.
    async fn run(
        &self,
        command: &GitCommand,
        progress: Option<&Progress>,
        cancel: &CancellationToken,
    ) -> GitResult<LogOutput>;

    /// Detects the git version, if the output contains one.
    ///
    /// # Errors
    ///
    /// Returns an error if `git --version` cannot be run.
    async fn git_version(&self, cancel: &CancellationToken) -> GitResult<Option<String>> {
        let output = self.run(&GitCommand::version(), None, cancel).await?;
        Ok(parse_git_version(&output.stdout))
    }

    /// Negotiates the log format for the detected git version.
    ///
    /// # Errors
    ///
    /// Returns an error if `git --version` cannot be run.
    async fn log_format(&self, cancel: &CancellationToken) -> GitResult<LogFormat> {
        let version = self.git_version(cancel).await?;
        debug!(?version, "detected git version");
        Ok(LogFormat::for_version(version.as_deref()))
    }
}

/// Runs commands with the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
    work_dir: Option<PathBuf>,
}

impl GitCli {
    /// Uses `git` from `PATH` in the current directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("git"),
            work_dir: None,
        }
    }

    /// Uses a specific git executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Runs git inside the given directory.
    #[must_use]
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogSource for GitCli {
    async fn run(
        &self,
        command: &GitCommand,
        progress: Option<&Progress>,
        cancel: &CancellationToken,
    ) -> GitResult<LogOutput> {
        let process_error = |source: std::io::Error| GitError::Process {
            command: command.to_string(),
            source,
        };
        debug!(%command, "running git");

        let mut cmd = Command::new(&self.program);
        cmd.args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(process_error)?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| process_error(std::io::Error::other("stdout was not captured")))?;

        let mut data = Vec::new();
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        loop {
            let read = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    child.kill().await.ok();
                    return Err(GitError::Cancelled { command: command.to_string() });
                }
                read = stdout.read(&mut chunk) => read.map_err(process_error)?,
            };
            if read == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read]);
            if let Some(progress) = progress {
                progress(data.len());
            }
        }

        let status = child.wait().await.map_err(process_error)?;
        if !status.success() {
            warn!(%command, %status, "git exited unsuccessfully");
        }

        Ok(LogOutput {
            stdout: String::from_utf8_lossy(&data).into_owned(),
            success: status.success(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_spawn_failure_is_process_error() {
        let git = GitCli::new().with_program("/nonexistent/git-binary");
        let result = git
            .run(&GitCommand::version(), None, &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(GitError::Process { .. })));
    }

    #[test]
    fn test_log_output_constructors() {
        assert!(LogOutput::new("abc").success);
        let failed = LogOutput::failed("");
        assert!(!failed.success);
        assert!(failed.stdout.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let git = GitCli::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = git.run(&GitCommand::version(), None, &cancel).await;
        // Process when git is not installed.
        assert!(matches!(
            result,
            Err(GitError::Cancelled { .. } | GitError::Process { .. })
        ));
    }

    #[tokio::test]
    async fn test_git_version_and_progress() {
        let git = GitCli::new();
        let received = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&received);
        let progress = move |bytes: usize| counter.store(bytes, Ordering::SeqCst);

        let Ok(output) = git
            .run(
                &GitCommand::version(),
                Some(&progress),
                &CancellationToken::new(),
            )
            .await
        else {
            // git is not installed in this environment
            return;
        };

        assert!(output.success);
        assert!(output.stdout.starts_with("git version"));
        assert_eq!(received.load(Ordering::SeqCst), output.stdout.len());
    }

    #[tokio::test]
    async fn test_runs_in_work_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let git = GitCli::new().with_work_dir(dir.path());

        // Not a repository: git fails, but stdout is still returned (empty).
        if let Ok(output) = git
            .run(
                &GitCommand::merges(None, None),
                None,
                &CancellationToken::new(),
            )
            .await
        {
            assert!(!output.success);
            assert!(output.stdout.is_empty());
        }
    }
}
