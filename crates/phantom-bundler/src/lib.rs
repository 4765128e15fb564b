//! # phantom-bundler
//!
//! Turns a [`BuildConfig`](phantom_config::BuildConfig) into bundled
//! automation scripts: entries are resolved and validated, the configured
//! plugins are aggregated behind the `virtual:phantom-plugins` module, and
//! Rolldown produces one ES module per entry.
//!
//! ```no_run
//! use std::sync::Arc;
//! use phantom_bundler::{DependencyClassifier, VirtualPluginModule, build, resolve_entries};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loaded = phantom_config::load(None, std::path::Path::new("."));
//! let resolution = resolve_entries(&loaded.config)?;
//! let result = build(
//!     &loaded.config,
//!     &resolution.entries,
//!     Arc::new(VirtualPluginModule::from_config(&loaded)),
//!     Arc::new(DependencyClassifier::from_config(&loaded.config)),
//! )
//! .await?;
//! result.write_to(loaded.config.resolved_out_dir(), true)?;
//! # Ok(()) }
//! ```

use std::path::PathBuf;

pub mod builders;
pub mod classify;
pub mod entry;
pub mod output;
pub mod plugins;
pub mod virtual_plugins;

pub use builders::{BuildResult, build};
pub use classify::{Classification, DependencyClassifier, is_builtin};
pub use entry::{EntryMap, EntryResolution, resolve_entries};
pub use plugins::{ExternalsPlugin, PhantomPlugin, PluginAggregatePlugin, PluginPhase, PluginRegistry};
pub use virtual_plugins::{
    Degradation, PUBLIC_ID, RESOLVED_ID, VirtualModule, VirtualModuleRecord, VirtualPluginModule,
    render_source,
};

pub use rolldown::BundleOutput;
pub use rolldown_common::Output;
pub use rolldown_plugin::__inner::SharedPluginable;

/// Error types for phantom-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// None of the configured entries exist.
    #[error("No valid entry files found ({} missing)", .missing.len())]
    NoValidEntries { missing: Vec<PathBuf> },

    /// Two entries derive the same output name.
    #[error(
        "Duplicate entry name '{name}': '{}' and '{}'",
        .first.display(),
        .second.display()
    )]
    DuplicateEntryName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Error from Rolldown bundler.
    #[error("Rolldown bundler error: {0}")]
    Bundler(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// Output file already exists and overwrite is disabled.
    #[error("Output exists: {0}")]
    OutputExists(String),
}

/// Result type alias for phantom-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a bundler error from a Rolldown error batch.
    pub fn from_rolldown_batch(error: &dyn std::fmt::Debug) -> Self {
        Error::Bundler(format!("{:?}", error))
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::NoValidEntries { .. } => "NO_VALID_ENTRIES",
            Error::DuplicateEntryName { .. } => "DUPLICATE_ENTRY_NAME",
            Error::Bundler(_) => "BUNDLER_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::OutputExists(_) => "OUTPUT_EXISTS",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::NoValidEntries { missing } => {
                let listed = missing
                    .iter()
                    .map(|p| format!("  - {}", p.display()))
                    .collect::<Vec<_>>()
                    .join("\n");
                Some(Box::new(format!(
                    "Set \"entry\" or \"entries\" in phantomvite.config.json to existing scripts.\nMissing:\n{}",
                    listed
                )))
            }
            Error::DuplicateEntryName { name, .. } => Some(Box::new(format!(
                "Both entries would be written to '{}.js'. Rename one of the files.",
                name
            ))),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it's within the project directory and doesn't contain '..' components.",
                path
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            Error::OutputExists(msg) => Some(Box::new(format!(
                "Output file already exists: {}",
                msg
            ))),
            _ => None,
        }
    }
}
