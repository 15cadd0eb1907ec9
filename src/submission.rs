//! Submission record and grading feedback
//!
//! One `Submission` is threaded through the pipeline per student directory,
//! accumulating stage statuses, grade deltas and feedback tags. It is
//! finalized into a `GradeReport` right before the result row is recorded.

use std::fmt;
use std::path::PathBuf;

use crate::stage::StageStatus;

/// Grade awarded when the source file sits directly in the student's folder
pub const FULL_GRADE: i32 = 100;
/// Deduction per nested directory level traversed to reach the source file
pub const DEPTH_PENALTY: i32 = 10;
/// Deduction for output that matches only up to whitespace and case
pub const SIMILAR_PENALTY: i32 = 30;

/// Feedback tag appended to a result row to explain the grade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    NoCFile,
    MultipleDirectories,
    CompilationError,
    Timeout,
    GreatJob,
    SimilarOutput,
    BadOutput,
    WrongDirectory,
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Feedback::NoCFile => "NO_C_FILE",
            Feedback::MultipleDirectories => "MULTIPLE_DIRECTORIES",
            Feedback::CompilationError => "COMPILATION_ERROR",
            Feedback::Timeout => "TIMEOUT",
            Feedback::GreatJob => "GREAT_JOB",
            Feedback::SimilarOutput => "SIMILAR_OUTPUT",
            Feedback::BadOutput => "BAD_OUTPUT",
            Feedback::WrongDirectory => "WRONG_DIRECTORY",
        };
        write!(f, "{}", s)
    }
}

/// Raw termination statuses of the three pipeline subprocesses
#[derive(Debug, Default)]
pub struct StageStatuses {
    pub compile: Option<StageStatus>,
    pub execute: Option<StageStatus>,
    pub compare: Option<StageStatus>,
}

/// One student's submission, mutated through each pipeline stage
#[derive(Debug)]
pub struct Submission {
    /// Directory-entry name, unique within the run
    pub name: String,
    /// Resolved path of the located source file
    pub source: Option<PathBuf>,
    /// Nested single-child directory levels traversed before the source
    /// file was found; 0 means it sat in the student's top-level folder
    pub depth: u32,
    /// Set when a level held more than one subdirectory and no source file
    pub multiple_subdirs: bool,
    /// Set when execution was forcibly terminated
    pub timed_out: bool,
    pub statuses: StageStatuses,
    grade: i32,
    feedback: Vec<Feedback>,
}

impl Submission {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            depth: 0,
            multiple_subdirs: false,
            timed_out: false,
            statuses: StageStatuses::default(),
            grade: 0,
            feedback: Vec::new(),
        }
    }

    /// Set the starting grade once the source file has been located
    pub fn set_base_grade(&mut self) {
        self.grade = FULL_GRADE - DEPTH_PENALTY * self.depth as i32;
    }

    pub fn deduct(&mut self, points: i32) {
        self.grade -= points;
    }

    pub fn zero_grade(&mut self) {
        self.grade = 0;
    }

    pub fn push_feedback(&mut self, tag: Feedback) {
        self.feedback.push(tag);
    }

    /// Clamp the grade and produce the final report row
    pub fn finalize(self) -> GradeReport {
        GradeReport {
            name: self.name,
            grade: self.grade.max(0) as u32,
            feedback: self.feedback,
        }
    }
}

/// Final grading result for one submission
#[derive(Debug, PartialEq, Eq)]
pub struct GradeReport {
    pub name: String,
    /// Never negative; clamped at finalization
    pub grade: u32,
    /// Ordered feedback tags
    pub feedback: Vec<Feedback>,
}

impl GradeReport {
    /// Render the `name,grade[,TAG]*` result row
    pub fn csv_row(&self) -> String {
        let mut row = format!("{},{}", self.name, self.grade);
        for tag in &self.feedback {
            row.push(',');
            row.push_str(&tag.to_string());
        }
        row
    }
}
