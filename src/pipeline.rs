//! Grading pipeline - per-submission state machine
//!
//! Drives one submission through locate, compile, execute and compare,
//! accumulating the grade and feedback tags. Early exits (no source file,
//! compile failure, timeout) route straight to the final report. Each
//! submission gets its own temporary workspace holding the compiled
//! executable and the captured output; the workspace is removed on every
//! exit path when it drops.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::comparator::Classification;
use crate::config::GradingConfig;
use crate::locator::{locate_source, Probe};
use crate::stage::{StageSpec, StageStatus};
use crate::submission::{Feedback, GradeReport, Submission, SIMILAR_PENALTY};

pub struct GradingPipeline<'a> {
    config: &'a GradingConfig,
}

impl<'a> GradingPipeline<'a> {
    pub fn new(config: &'a GradingConfig) -> Self {
        Self { config }
    }

    /// Grade one submission directory entry to completion
    pub async fn grade(&self, name: &str) -> Result<GradeReport> {
        let mut submission = Submission::new(name);
        let student_dir = self.config.submissions_dir.join(name);

        match locate_source(&student_dir)? {
            Probe::Located { source, depth } => {
                info!("{}: located {} at depth {}", name, source.display(), depth);
                submission.source = Some(source);
                submission.depth = depth;
            }
            Probe::NotFound => {
                info!("{}: no C file", name);
                submission.push_feedback(Feedback::NoCFile);
                return Ok(submission.finalize());
            }
            Probe::MultipleSubdirs => {
                info!("{}: multiple directories", name);
                submission.multiple_subdirs = true;
                submission.push_feedback(Feedback::MultipleDirectories);
                return Ok(submission.finalize());
            }
        }
        submission.set_base_grade();

        // Per-submission workspace; dropped (and removed) on every exit path.
        let workspace = tempfile::Builder::new()
            .prefix("autograder-")
            .tempdir()
            .context("failed to create submission workspace")?;
        let executable = workspace.path().join("student");
        let captured = workspace.path().join("output.txt");

        // Compile.
        let source = submission.source.clone().unwrap_or_default();
        let status = StageSpec::new(&self.config.compiler)
            .with_args([
                source.to_string_lossy().into_owned(),
                "-o".into(),
                executable.to_string_lossy().into_owned(),
            ])
            .run()
            .await?;
        submission.statuses.compile = Some(status);
        // Compiler contract: exit code 1 is a compilation error, any other
        // exit is success. A crashed compiler counts as a failure too.
        if matches!(status, StageStatus::Exited(1) | StageStatus::Signaled(_)) {
            info!("{}: compilation failed ({:?})", name, status);
            submission.zero_grade();
            submission.push_feedback(Feedback::CompilationError);
            return Ok(submission.finalize());
        }

        // Execute with the input file on stdin and a bounded wall-clock budget.
        let status = StageSpec::new(&executable)
            .with_args([self.config.input_path.to_string_lossy().into_owned()])
            .with_stdin(&self.config.input_path)
            .with_stdout(&captured)
            .with_deadline(self.config.execute_timeout)
            .run()
            .await?;
        submission.statuses.execute = Some(status);
        match status {
            StageStatus::TimedOut => {
                info!("{}: timed out", name);
                submission.timed_out = true;
                submission.zero_grade();
                submission.push_feedback(Feedback::Timeout);
                return Ok(submission.finalize());
            }
            StageStatus::Signaled(signal) => {
                // Crash during execution is a grading outcome, not a batch
                // failure; whatever output was captured gets compared.
                warn!("{}: program killed by signal {}", name, signal);
            }
            StageStatus::Exited(code) if code != 0 => {
                debug!("{}: program exited with code {}", name, code);
            }
            StageStatus::Exited(_) => {}
        }

        // Compare the captured output against the reference.
        let status = StageSpec::new(&self.config.comparator)
            .with_args([
                captured.to_string_lossy().into_owned(),
                self.config.expected_path.to_string_lossy().into_owned(),
            ])
            .run()
            .await?;
        submission.statuses.compare = Some(status);

        let classification = match status {
            StageStatus::Exited(code) => Classification::from_exit_code(code),
            _ => None,
        };
        match classification {
            Some(Classification::Identical) => {
                submission.push_feedback(Feedback::GreatJob);
            }
            Some(Classification::Similar) => {
                submission.deduct(SIMILAR_PENALTY);
                submission.push_feedback(Feedback::SimilarOutput);
            }
            Some(Classification::Bad) => {
                submission.zero_grade();
                submission.push_feedback(Feedback::BadOutput);
            }
            None => {
                warn!("{}: comparator ended unexpectedly ({:?})", name, status);
                submission.zero_grade();
                submission.push_feedback(Feedback::BadOutput);
            }
        }

        if submission.depth > 0 {
            submission.push_feedback(Feedback::WrongDirectory);
        }

        Ok(submission.finalize())
    }
}
