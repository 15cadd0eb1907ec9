//! Standalone output comparator
//!
//! Invoked as `comp <actual> <expected>`. The classification is reported
//! through the exit code: 1 = identical, 2 = similar but not identical,
//! 3 = neither. Misuse and unreadable operands also exit 3 so a caller
//! treating the pair as graded output sees a bad match rather than a hang.

use std::path::PathBuf;
use std::process::ExitCode;

use autograder::comparator::{classify, Classification};

fn main() -> ExitCode {
    let mut args = std::env::args_os().skip(1);
    let (actual, expected) = match (args.next(), args.next(), args.next()) {
        (Some(a), Some(b), None) => (PathBuf::from(a), PathBuf::from(b)),
        _ => {
            eprintln!("usage: comp <actual> <expected>");
            return ExitCode::from(Classification::Bad.exit_code() as u8);
        }
    };

    match classify(&actual, &expected) {
        Ok(classification) => ExitCode::from(classification.exit_code() as u8),
        Err(err) => {
            eprintln!("comp: {:#}", err);
            ExitCode::from(Classification::Bad.exit_code() as u8)
        }
    }
}
