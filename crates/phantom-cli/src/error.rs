//! Error handling for the Phantom CLI.
//!
//! Library crates keep their own `thiserror` enums; [`CliError`] wraps them
//! so every command returns one type, and [`cli_error_to_miette`] turns it
//! into a report at the edge of `main`.

use std::path::PathBuf;

use miette::Report;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Entry resolution, bundling or output failures.
    #[error(transparent)]
    Bundle(#[from] phantom_bundler::Error),

    /// The runner script could not be generated.
    #[error("Runner error: {0}")]
    Runner(#[from] phantom_runtime::RunnerError),

    /// The `--cwd` directory does not exist.
    #[error("Project directory not found: {}", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `phantom check` found problems that would break a run.
    #[error("Check failed: {0}")]
    CheckFailed(String),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Convert a [`CliError`] into a miette report.
///
/// Bundler errors carry their own diagnostic code and help text; everything
/// else is reported by message.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Bundle(e) => Report::new(e),
        CliError::ProjectNotFound(path) => miette::miette!(
            help = "Pass an existing directory to --cwd",
            "Project directory not found: {}",
            path.display()
        ),
        other => miette::miette!("{}", other),
    }
}
