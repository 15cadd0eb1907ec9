//! Grading run configuration
//!
//! The instructor hands the driver a three-line configuration file:
//! the submissions root directory, the input file fed to every student
//! program, and the expected-output file. External program paths (the C
//! compiler and the output comparator) come from the environment with
//! sensible defaults.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Default wall-clock budget for one student program run
pub const DEFAULT_EXECUTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variable overriding the C compiler program
pub const CC_ENV: &str = "AUTOGRADER_CC";
/// Environment variable overriding the comparator program
pub const COMP_ENV: &str = "AUTOGRADER_COMP";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config file is missing the {0} line")]
    MissingLine(&'static str),
}

/// Configuration for one grading batch
#[derive(Debug, Clone)]
pub struct GradingConfig {
    /// Root directory holding one folder per student
    pub submissions_dir: PathBuf,
    /// Input file redirected to each student program's stdin
    pub input_path: PathBuf,
    /// Reference output the captured stdout is compared against
    pub expected_path: PathBuf,
    /// Compiler program invoked as `cc <source> -o <exe>`
    pub compiler: PathBuf,
    /// Comparator program invoked as `comp <actual> <expected>`
    pub comparator: PathBuf,
    /// Wall-clock budget for the execute stage
    pub execute_timeout: Duration,
}

impl GradingConfig {
    /// Load the three-line config file and resolve environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut lines = content.lines();
        let mut next_line = |what| {
            lines
                .next()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(PathBuf::from)
                .ok_or(ConfigError::MissingLine(what))
        };

        Ok(Self {
            submissions_dir: next_line("submissions directory")?,
            input_path: next_line("input file")?,
            expected_path: next_line("expected output file")?,
            compiler: compiler_from_env(),
            comparator: comparator_from_env(),
            execute_timeout: DEFAULT_EXECUTE_TIMEOUT,
        })
    }
}

fn compiler_from_env() -> PathBuf {
    std::env::var(CC_ENV).unwrap_or_else(|_| "gcc".into()).into()
}

/// Default to the `comp` binary shipped next to the driver executable
fn comparator_from_env() -> PathBuf {
    if let Ok(path) = std::env::var(COMP_ENV) {
        return path.into();
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("comp")))
        .unwrap_or_else(|| "comp".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "/srv/submissions").unwrap();
        writeln!(file, "/srv/input.txt").unwrap();
        writeln!(file, "/srv/expected.txt").unwrap();

        let config = GradingConfig::load(file.path()).unwrap();
        assert_eq!(config.submissions_dir, PathBuf::from("/srv/submissions"));
        assert_eq!(config.input_path, PathBuf::from("/srv/input.txt"));
        assert_eq!(config.expected_path, PathBuf::from("/srv/expected.txt"));
        assert_eq!(config.execute_timeout, DEFAULT_EXECUTE_TIMEOUT);
    }

    #[test]
    fn test_missing_line_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "/srv/submissions").unwrap();
        writeln!(file, "/srv/input.txt").unwrap();

        let err = GradingConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingLine("expected output file")));
    }

    #[test]
    fn test_unreadable_config_is_an_error() {
        let err = GradingConfig::load("/nonexistent/grader.conf").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
