//! Batch driver
//!
//! Reads the three-line grading configuration, iterates the submissions
//! directory and runs the grading pipeline for one student at a time,
//! appending each result row as soon as it is known. Operational failures
//! abort the batch; per-submission outcomes never do.

use anyhow::{Context, Result};
use tracing::{info, warn};

use autograder::config::GradingConfig;
use autograder::pipeline::GradingPipeline;
use autograder::results::{append_result, RESULTS_FILE};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("autograder=info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let config_path = std::env::args()
        .nth(1)
        .context("usage: autograder <config-file>")?;
    let config = GradingConfig::load(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;

    info!(
        "grading submissions under {} against {}",
        config.submissions_dir.display(),
        config.expected_path.display()
    );

    let mut names: Vec<String> = Vec::new();
    let entries = std::fs::read_dir(&config.submissions_dir).with_context(|| {
        format!(
            "failed to open submissions directory {}",
            config.submissions_dir.display()
        )
    })?;
    for entry in entries {
        let entry = entry.context("failed to read submissions directory entry")?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to stat {}", entry.path().display()))?;
        if !file_type.is_dir() {
            warn!("skipping non-directory entry {}", entry.path().display());
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    let pipeline = GradingPipeline::new(&config);
    let mut graded = 0usize;
    for name in &names {
        let report = pipeline.grade(name).await?;
        info!("{}: grade {}", name, report.grade);
        append_result(RESULTS_FILE, &report)?;
        graded += 1;
    }

    info!("batch complete: {} submissions graded", graded);
    Ok(())
}
