//! Results file recorder
//!
//! Appends one `name,grade[,TAG]*` row per submission to `results.csv`.
//! The file is opened, appended and closed for every row so partial
//! progress survives an interrupted batch.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::submission::GradeReport;

/// Default results file, created in the working directory at batch start
pub const RESULTS_FILE: &str = "results.csv";

/// Append one result row; creates the file if absent
pub fn append_result(path: impl AsRef<Path>, report: &GradeReport) -> Result<()> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open results file {}", path.display()))?;
    writeln!(file, "{}", report.csv_row())
        .with_context(|| format!("failed to append to results file {}", path.display()))?;
    Ok(())
}
