//! Submission locator - constrained directory descent
//!
//! Students are expected to place a single `.c` file directly in their
//! folder, but many submit it wrapped in nested directories. The locator
//! descends the tree under one rule: a level may contain at most one
//! subdirectory to descend into. A source file found at a level wins
//! immediately, even when subdirectories coexist at that level.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// Source file extension accepted by the grader
pub const SOURCE_EXTENSION: &str = "c";

/// Outcome of probing one student directory
#[derive(Debug, PartialEq, Eq)]
pub enum Probe {
    /// Source file found after `depth` single-child directory levels
    Located { source: PathBuf, depth: u32 },
    /// No source file and no directory left to descend into
    NotFound,
    /// A level held more than one subdirectory and no source file
    MultipleSubdirs,
}

/// Descend from the student's top-level directory looking for the source file.
///
/// The top-level directory itself counts as depth 0. Read failures are
/// operational errors and abort the batch.
pub fn locate_source(student_dir: &Path) -> Result<Probe> {
    let mut dir = student_dir.to_path_buf();
    let mut depth = 0u32;

    loop {
        let mut subdirs: Vec<PathBuf> = Vec::new();
        let mut source: Option<PathBuf> = None;

        // The listing is fully consumed and dropped before any descent.
        let entries = std::fs::read_dir(&dir)
            .with_context(|| format!("failed to read directory {}", dir.display()))?;
        for entry in entries {
            let entry = entry
                .with_context(|| format!("failed to read entry under {}", dir.display()))?;
            let file_type = entry
                .file_type()
                .with_context(|| format!("failed to stat {}", entry.path().display()))?;
            let path = entry.path();
            if file_type.is_dir() {
                subdirs.push(path);
            } else if is_source_file(&path) {
                source = Some(path);
                break;
            }
        }

        // A source file at this level takes priority over further descent.
        if let Some(source) = source {
            debug!("located {} at depth {}", source.display(), depth);
            return Ok(Probe::Located { source, depth });
        }

        match subdirs.len() {
            0 => return Ok(Probe::NotFound),
            1 => {
                dir = subdirs.remove(0);
                depth += 1;
            }
            _ => {
                debug!("{} subdirectories under {}", subdirs.len(), dir.display());
                return Ok(Probe::MultipleSubdirs);
            }
        }
    }
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
        .unwrap_or(false)
}
