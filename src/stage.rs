//! Process stage - spawn, redirect, wait, classify
//!
//! Every pipeline stage (compile, execute, compare) drives one external
//! program the same way: spawn a child with stdin/stdout optionally
//! redirected to files, wait for it (bounded by a wall-clock deadline for
//! the execute stage), and classify the raw termination status. Failure to
//! spawn at all is an operational error that aborts the whole batch.

use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, warn};

/// Raw termination status of a stage subprocess
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// Process exited normally with the given code
    Exited(i32),
    /// Process was killed by the given signal
    Signaled(i32),
    /// Process outlived its wall-clock budget and was forcibly killed
    TimedOut,
}

impl StageStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, StageStatus::Exited(0))
    }
}

/// Specification of one stage subprocess
#[derive(Debug)]
pub struct StageSpec {
    program: PathBuf,
    args: Vec<String>,
    stdin: Option<PathBuf>,
    stdout: Option<PathBuf>,
    deadline: Option<Duration>,
}

impl StageSpec {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            stdin: None,
            stdout: None,
            deadline: None,
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(|a| a.into()).collect();
        self
    }

    /// Redirect the child's stdin to read from the given file
    pub fn with_stdin(mut self, path: impl AsRef<Path>) -> Self {
        self.stdin = Some(path.as_ref().to_path_buf());
        self
    }

    /// Redirect the child's stdout to (over)write the given file
    pub fn with_stdout(mut self, path: impl AsRef<Path>) -> Self {
        self.stdout = Some(path.as_ref().to_path_buf());
        self
    }

    /// Bound the wait by a wall-clock deadline; expiry kills the child
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Run the stage to completion and classify its termination status
    pub async fn run(&self) -> Result<StageStatus> {
        debug!("running stage: {:?} {:?}", self.program, self.args);

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        if let Some(path) = &self.stdin {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open stdin redirect {}", path.display()))?;
            cmd.stdin(Stdio::from(file));
        }
        if let Some(path) = &self.stdout {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create stdout redirect {}", path.display()))?;
            cmd.stdout(Stdio::from(file));
        }

        // A spawn failure means the grading run itself cannot proceed.
        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.program.display()))?;

        let status = match self.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, child.wait()).await {
                Ok(status) => status.with_context(|| {
                    format!("failed to wait for {}", self.program.display())
                })?,
                Err(_) => {
                    warn!(
                        "{} exceeded its {:?} budget, killing it",
                        self.program.display(),
                        deadline
                    );
                    child.kill().await.with_context(|| {
                        format!("failed to kill {}", self.program.display())
                    })?;
                    return Ok(StageStatus::TimedOut);
                }
            },
            None => child
                .wait()
                .await
                .with_context(|| format!("failed to wait for {}", self.program.display()))?,
        };

        Ok(match status.code() {
            Some(code) => StageStatus::Exited(code),
            None => StageStatus::Signaled(status.signal().unwrap_or(-1)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_exit_code_classification() {
        let status = StageSpec::new("/bin/sh")
            .with_args(["-c", "exit 0"])
            .run()
            .await
            .unwrap();
        assert_eq!(status, StageStatus::Exited(0));
        assert!(status.is_success());

        let status = StageSpec::new("/bin/sh")
            .with_args(["-c", "exit 3"])
            .run()
            .await
            .unwrap();
        assert_eq!(status, StageStatus::Exited(3));
        assert!(!status.is_success());
    }

    #[tokio::test]
    async fn test_signal_classification() {
        let status = StageSpec::new("/bin/sh")
            .with_args(["-c", "kill -KILL $$"])
            .run()
            .await
            .unwrap();
        assert_eq!(status, StageStatus::Signaled(9));
    }

    #[tokio::test]
    async fn test_deadline_kills_the_child() {
        let started = Instant::now();
        let status = StageSpec::new("/bin/sh")
            .with_args(["-c", "sleep 30"])
            .with_deadline(Duration::from_millis(200))
            .run()
            .await
            .unwrap();
        assert_eq!(status, StageStatus::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_stdout_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let status = StageSpec::new("/bin/sh")
            .with_args(["-c", "echo hello"])
            .with_stdout(&out)
            .run()
            .await
            .unwrap();
        assert!(status.is_success());
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "hello\n");
    }

    #[tokio::test]
    async fn test_stdin_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let out = dir.path().join("out.txt");
        std::fs::write(&input, "ping\n").unwrap();

        let status = StageSpec::new("/bin/cat")
            .with_stdin(&input)
            .with_stdout(&out)
            .run()
            .await
            .unwrap();
        assert!(status.is_success());
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "ping\n");
    }

    #[tokio::test]
    async fn test_spawn_failure_is_an_error() {
        let err = StageSpec::new("/nonexistent/program").run().await;
        assert!(err.is_err());
    }
}
