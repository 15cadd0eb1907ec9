//! Batch autograder for C exercise submissions
//!
//! Given a directory of per-student folders, the grader locates each
//! student's single C source file, compiles it, runs it against a fixed
//! input under a wall-clock timeout, classifies the output against a
//! reference, and appends a grade row with feedback tags to the results
//! file. Submissions are processed strictly one at a time.

pub mod comparator;
pub mod config;
pub mod locator;
pub mod pipeline;
pub mod results;
pub mod stage;
pub mod submission;
