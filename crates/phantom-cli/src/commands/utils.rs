//! Helpers shared by the commands.

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use phantom_config::LoadedConfig;

use crate::error::{CliError, Result};
use crate::ui;

/// The project root: `--cwd` resolved against the process directory, or the
/// process directory itself.
pub fn project_root(cwd: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    let root = match cwd {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => current.join(dir).clean(),
        None => current,
    };
    if !root.is_dir() {
        return Err(CliError::ProjectNotFound(root));
    }
    Ok(root)
}

/// Print every configuration warning as a status line.
pub fn report_config_warnings(loaded: &LoadedConfig) {
    for warning in &loaded.warnings {
        ui::warning(&warning.to_string());
    }
    if loaded.used_defaults() {
        ui::info("Using default configuration");
    }
}

/// Directory a package would be installed in under `root/node_modules`.
///
/// Scoped names keep their scope (`@playwright/test`); anything after the
/// package name is a sub-path and is dropped.
pub fn package_dir(root: &Path, specifier: &str) -> PathBuf {
    let mut segments = specifier.split('/');
    let mut dir = root.join("node_modules");
    if let Some(first) = segments.next() {
        dir.push(first);
        if first.starts_with('@') {
            if let Some(name) = segments.next() {
                dir.push(name);
            }
        }
    }
    dir
}

/// Engines `check` reports on, in display order.
pub const KNOWN_ENGINES: &[&str] = &["puppeteer", "playwright", "selenium", "gemini"];

/// Installation state of one automation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineStatus {
    pub name: &'static str,
    /// Where it was found, when it was.
    pub location: Option<String>,
    /// How to install it.
    pub hint: &'static str,
}

/// Look up every known engine. Node engines are looked up under
/// `root/node_modules`, selenium by its `chromedriver` and gemini by its
/// executable on `PATH`.
pub fn engine_statuses(root: &Path) -> Vec<EngineStatus> {
    KNOWN_ENGINES
        .iter()
        .map(|&name| {
            let (location, hint) = match name {
                "selenium" => (
                    on_path("chromedriver"),
                    "Run: pip install selenium, and put chromedriver on PATH",
                ),
                "gemini" => (on_path("gemini"), "Run: npm install -g @google/gemini-cli"),
                "playwright" => (node_package(root, name), "Run: npm install playwright"),
                _ => (node_package(root, name), "Run: npm install puppeteer"),
            };
            EngineStatus {
                name,
                location,
                hint,
            }
        })
        .collect()
}

fn node_package(root: &Path, name: &str) -> Option<String> {
    package_installed(root, name).then(|| format!("node_modules/{}", name))
}

fn on_path(binary: &str) -> Option<String> {
    which::which(binary)
        .ok()
        .map(|path| path.display().to_string())
}

/// Whether `specifier` is installed under `root/node_modules`.
pub fn package_installed(root: &Path, specifier: &str) -> bool {
    package_dir(root, specifier).is_dir()
}
