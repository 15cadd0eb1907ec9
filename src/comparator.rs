//! Output comparator - identical / similar / bad classification
//!
//! Compares a captured program output against the reference output in two
//! passes: an exact byte-for-byte check first, then a lenient check that
//! skips runs of spaces and newlines and compares the remaining characters
//! case-insensitively. The `comp` binary wraps this module and reports the
//! classification through its exit code, which the compare stage consumes.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

/// Classification of an output pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Equal length, byte-for-byte equal content
    Identical,
    /// Equal after discarding spaces/newlines and letter case
    Similar,
    /// Different in some meaningful character
    Bad,
}

impl Classification {
    /// Exit code reported by the `comp` binary
    pub fn exit_code(&self) -> i32 {
        match self {
            Classification::Identical => 1,
            Classification::Similar => 2,
            Classification::Bad => 3,
        }
    }

    /// Map a `comp` exit code back to a classification
    pub fn from_exit_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Classification::Identical),
            2 => Some(Classification::Similar),
            3 => Some(Classification::Bad),
            _ => None,
        }
    }
}

/// Classify a pair of output files
pub fn classify(actual: &Path, expected: &Path) -> Result<Classification> {
    if identical(actual, expected)? {
        Ok(Classification::Identical)
    } else if similar(actual, expected)? {
        Ok(Classification::Similar)
    } else {
        Ok(Classification::Bad)
    }
}

/// Byte-for-byte lockstep comparison; any positional mismatch or length
/// difference fails the check
fn identical(left: &Path, right: &Path) -> Result<bool> {
    let mut left = reader(left)?;
    let mut right = reader(right)?;

    loop {
        match (left.next_byte()?, right.next_byte()?) {
            (None, None) => return Ok(true),
            (Some(a), Some(b)) if a == b => continue,
            _ => return Ok(false),
        }
    }
}

/// Whitespace-insensitive, case-insensitive comparison. Only spaces and
/// newlines are insignificant; both sides must reach end-of-file on the
/// same step
fn similar(left: &Path, right: &Path) -> Result<bool> {
    let mut left = reader(left)?;
    let mut right = reader(right)?;

    loop {
        match (left.next_meaningful()?, right.next_meaningful()?) {
            (None, None) => return Ok(true),
            (Some(a), Some(b)) if a.eq_ignore_ascii_case(&b) => continue,
            _ => return Ok(false),
        }
    }
}

fn reader(path: &Path) -> Result<ByteReader> {
    let file = File::open(path)
        .with_context(|| format!("failed to open {} for comparison", path.display()))?;
    Ok(ByteReader {
        bytes: BufReader::new(file).bytes(),
    })
}

/// One-byte-at-a-time reader over a file
struct ByteReader {
    bytes: std::io::Bytes<BufReader<File>>,
}

impl ByteReader {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        self.bytes
            .next()
            .transpose()
            .context("failed to read byte during comparison")
    }

    /// Next byte that is not a space or newline
    fn next_meaningful(&mut self) -> Result<Option<u8>> {
        loop {
            match self.next_byte()? {
                Some(b' ') | Some(b'\n') => continue,
                other => return Ok(other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "a", "hello world\n42\n");
        let b = write_file(&dir, "b", "hello world\n42\n");
        assert_eq!(classify(&a, &b).unwrap(), Classification::Identical);
    }

    #[test]
    fn test_empty_files_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "a", "");
        let b = write_file(&dir, "b", "");
        assert_eq!(classify(&a, &b).unwrap(), Classification::Identical);
    }

    #[test]
    fn test_whitespace_runs_are_similar() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "a", "hello   world\n\n42\n");
        let b = write_file(&dir, "b", "hello world\n42\n");
        assert_eq!(classify(&a, &b).unwrap(), Classification::Similar);
    }

    #[test]
    fn test_letter_case_is_similar() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "a", "Hello World\n");
        let b = write_file(&dir, "b", "hello world\n");
        assert_eq!(classify(&a, &b).unwrap(), Classification::Similar);
    }

    #[test]
    fn test_leading_and_trailing_whitespace_is_similar() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "a", "  42");
        let b = write_file(&dir, "b", "42\n");
        assert_eq!(classify(&a, &b).unwrap(), Classification::Similar);
    }

    #[test]
    fn test_meaningful_difference_is_bad() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "a", "hello world\n");
        let b = write_file(&dir, "b", "hello there\n");
        assert_eq!(classify(&a, &b).unwrap(), Classification::Bad);
    }

    #[test]
    fn test_extra_meaningful_characters_are_bad() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "a", "4242\n");
        let b = write_file(&dir, "b", "42\n");
        assert_eq!(classify(&a, &b).unwrap(), Classification::Bad);
    }

    #[test]
    fn test_tabs_are_meaningful() {
        // Only spaces and newlines are insignificant in similar mode.
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "a", "a\tb\n");
        let b = write_file(&dir, "b", "a b\n");
        assert_eq!(classify(&a, &b).unwrap(), Classification::Bad);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "a", "Hello\n World\n");
        let b = write_file(&dir, "b", "hello world\n");
        let first = classify(&a, &b).unwrap();
        let second = classify(&a, &b).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_exit_code_round_trip() {
        for class in [
            Classification::Identical,
            Classification::Similar,
            Classification::Bad,
        ] {
            assert_eq!(Classification::from_exit_code(class.exit_code()), Some(class));
        }
        assert_eq!(Classification::from_exit_code(0), None);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(&dir, "a", "x\n");
        assert!(classify(&a, &dir.path().join("missing")).is_err());
    }
}
