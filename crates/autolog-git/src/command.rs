//! Shapes of the git commands issued by the engine.

use std::fmt;

use crate::LogFormat;

/// A git invocation, as a list of arguments after the `git` program name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    args: Vec<String>,
}

impl GitCommand {
    /// `git --version`.
    #[must_use]
    pub fn version() -> Self {
        Self::from_args(["--version"])
    }

    /// Top-level query: merge commits only, following first parents.
    ///
    /// A starting commit bounds the range to `HEAD...<commit>` and takes
    /// precedence over the branch.
    #[must_use]
    pub fn merges(branch: Option<&str>, starting_commit: Option<&str>) -> Self {
        match (starting_commit, branch) {
            (Some(commit), _) => Self::from_args([
                "log".to_string(),
                format!("HEAD...{commit}"),
                "--merges".to_string(),
                "--first-parent".to_string(),
            ]),
            (None, Some(branch)) => Self::from_args(["log", "--merges", "--first-parent", branch]),
            (None, None) => Self::from_args(["log", "--merges", "--first-parent"]),
        }
    }

    /// Secondary query: the non-merge commits brought in by one merge commit.
    #[must_use]
    pub fn unfold(hash: &str) -> Self {
        Self::from_args([
            "log".to_string(),
            format!("{hash}^..{hash}"),
            "--no-merges".to_string(),
        ])
    }

    /// Appends the diff stats flag and the negotiated format.
    #[must_use]
    pub fn with_format(mut self, format: &LogFormat) -> Self {
        self.args.push("--shortstat".to_string());
        self.args.push(format!("--pretty=format:{}", format.template()));
        self
    }

    /// Returns the arguments passed to git.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git {}", self.args.join(" "))
    }
}
