//! Entry resolution: configured entry paths to a named bundler input map.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use indexmap::map::Entry;
use path_clean::PathClean;
use phantom_config::BuildConfig;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Derived entry name to absolute entry path, in configured order.
pub type EntryMap = IndexMap<String, PathBuf>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryResolution {
    pub entries: EntryMap,
    /// Configured paths that were dropped because they do not exist.
    pub missing: Vec<PathBuf>,
}

/// Resolve the configured entries against the project root.
///
/// Missing files are logged and reported in [`EntryResolution::missing`].
/// The same file listed twice is kept once. Fails with
/// [`Error::NoValidEntries`] when nothing survives and with
/// [`Error::DuplicateEntryName`] when two different files share a stem.
pub fn resolve_entries(config: &BuildConfig) -> Result<EntryResolution> {
    let mut entries = EntryMap::new();
    let mut missing = Vec::new();

    for configured in &config.entries {
        let absolute = absolutize(&config.root, configured);
        if !absolute.is_file() {
            warn!("Missing entry: {}", configured.display());
            missing.push(configured.clone());
            continue;
        }

        let name = entry_name(&absolute);
        match entries.entry(name) {
            Entry::Occupied(existing) if *existing.get() == absolute => {
                warn!("Entry listed twice, keeping the first: {}", configured.display());
            }
            Entry::Occupied(existing) => {
                return Err(Error::DuplicateEntryName {
                    name: existing.key().clone(),
                    first: existing.get().clone(),
                    second: absolute,
                });
            }
            Entry::Vacant(slot) => {
                debug!(name = %slot.key(), path = %absolute.display(), "Resolved entry");
                slot.insert(absolute);
            }
        }
    }

    if entries.is_empty() {
        return Err(Error::NoValidEntries { missing });
    }

    Ok(EntryResolution { entries, missing })
}

fn absolutize(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.clean()
    } else {
        root.join(path).clean()
    }
}

/// Base name without its last extension: `scripts/login.ts` is `login`.
fn entry_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
