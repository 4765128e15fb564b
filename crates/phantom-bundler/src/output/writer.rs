//! Atomic, contained writes of bundle output.
//!
//! Every file lands inside the output directory or the whole write is
//! refused. Files are staged next to their targets and renamed into place
//! only after all of them were written; a failure removes whatever was staged.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use rolldown::BundleOutput;
use rolldown_common::Output;
use tracing::{debug, warn};

use crate::{Error, Result};

const STAGING_SUFFIX: &str = "phantom-tmp";

/// Write every chunk and asset of `output` into `dir`.
///
/// Returns the written paths in output order. With `overwrite` off, an
/// existing target aborts the write before anything is touched.
pub fn write_bundle_to(output: &BundleOutput, dir: &Path, overwrite: bool) -> Result<Vec<PathBuf>> {
    let dir = normalize_dir(dir)?;

    fs::create_dir_all(&dir).map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to create output directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut operations = Vec::with_capacity(output.assets.len());
    for item in &output.assets {
        let (filename, contents): (&str, &[u8]) = match item {
            Output::Chunk(chunk) => (chunk.filename.as_str(), chunk.code.as_bytes()),
            Output::Asset(asset) => (asset.filename.as_str(), asset.source.as_bytes()),
        };
        let target = contained_path(&dir, filename)?;
        if !overwrite && target.exists() {
            return Err(Error::OutputExists(target.display().to_string()));
        }
        operations.push((target, contents));
    }

    write_staged(&operations)?;
    debug!(files = operations.len(), dir = %dir.display(), "Wrote bundle");

    Ok(operations.into_iter().map(|(path, _)| path).collect())
}

fn normalize_dir(dir: &Path) -> Result<PathBuf> {
    let cleaned = dir.clean();
    if cleaned.is_absolute() {
        return Ok(cleaned);
    }
    let cwd = std::env::current_dir()
        .map_err(|e| Error::InvalidOutputPath(format!("Failed to get current directory: {}", e)))?;
    Ok(cwd.join(cleaned).clean())
}

/// Join `filename` onto `base_dir`, refusing anything that escapes it.
fn contained_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();
    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "'{}' escapes output directory '{}'",
            filename,
            base_dir.display()
        )));
    }

    Ok(full_path)
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(STAGING_SUFFIX);
    target.with_file_name(name)
}

fn write_staged(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(operations.len());

    for (target, contents) in operations {
        if let Some(parent) = target.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                discard(&staged);
                return Err(Error::WriteFailure(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                )));
            }
        }

        let temp = staging_path(target);
        if let Err(e) = fs::write(&temp, contents) {
            discard(&staged);
            return Err(Error::WriteFailure(format!(
                "Failed to write '{}': {}",
                temp.display(),
                e
            )));
        }
        staged.push((temp, target.as_path()));
    }

    for (temp, target) in &staged {
        if let Err(e) = fs::rename(temp, target) {
            discard(&staged);
            return Err(Error::WriteFailure(format!(
                "Failed to move '{}' into place: {}",
                target.display(),
                e
            )));
        }
    }

    Ok(())
}

fn discard(staged: &[(PathBuf, &Path)]) {
    for (temp, _) in staged {
        if temp.exists() {
            if let Err(e) = fs::remove_file(temp) {
                warn!("Failed to remove staged file '{}': {}", temp.display(), e);
            }
        }
    }
}
