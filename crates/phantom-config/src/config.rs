//! The immutable build configuration shared by every Phantom component.

use std::path::{Path, PathBuf};
use std::time::Duration;

use path_clean::PathClean;
use serde::{Deserialize, Serialize};

/// Conventional name of the configuration file, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "phantomvite.config.json";

/// Entry used when the configuration does not name any.
pub const DEFAULT_ENTRY: &str = "scripts/example.ts";

const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "ts", "mts", "cts", "jsx", "tsx"];

/// How bare imports are split between the bundle and run-time externals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleMode {
    /// Only platform built-ins stay external.
    #[default]
    ExternalizeBuiltins,
    /// Platform built-ins and automation drivers stay external.
    ExternalizeDrivers,
    /// Everything except platform built-ins is bundled.
    BundleEverything,
}

impl BundleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleMode::ExternalizeBuiltins => "externalize-builtins",
            BundleMode::ExternalizeDrivers => "externalize-drivers",
            BundleMode::BundleEverything => "bundle-everything",
        }
    }
}

impl std::fmt::Display for BundleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BundleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "externalize-builtins" | "builtins" => Ok(BundleMode::ExternalizeBuiltins),
            "externalize-drivers" | "drivers" => Ok(BundleMode::ExternalizeDrivers),
            "bundle-everything" | "all" => Ok(BundleMode::BundleEverything),
            other => Err(format!("Invalid bundle mode: {}", other)),
        }
    }
}

/// Browser viewport handed to the automation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// A configured plugin module and its position in the plugin list.
///
/// The ordinal is the only ordering key: hooks run and the virtual module
/// exports plugins in ascending ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub ordinal: usize,
    pub specifier: String,
}

impl PluginDescriptor {
    /// Build descriptors from an ordered list of specifiers.
    pub fn from_specifiers<I, S>(specifiers: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        specifiers
            .into_iter()
            .enumerate()
            .map(|(ordinal, specifier)| Self {
                ordinal,
                specifier: specifier.into(),
            })
            .collect()
    }

    /// Whether the specifier names a file rather than a package.
    ///
    /// `./x`, `../x` and absolute paths are files. Outside a package scope,
    /// so is anything with a directory component (`plugins/seo`) or a script
    /// extension (`seo.js`). A single bare segment (`seo`) or a scoped name
    /// (`@acme/seo`) is a package.
    pub fn is_path(&self) -> bool {
        let spec = self.specifier.as_str();
        if spec.starts_with("./")
            || spec.starts_with("../")
            || spec == "."
            || spec == ".."
            || Path::new(spec).is_absolute()
        {
            return true;
        }
        if spec.starts_with('@') {
            return false;
        }
        spec.contains('/')
            || Path::new(spec)
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
    }

    /// Import path for this plugin as seen from `root`.
    ///
    /// Filesystem paths become absolute and lexically cleaned, package names
    /// are left for the bundler's own resolver.
    pub fn import_path(&self, root: &Path) -> String {
        if self.is_path() {
            root.join(&self.specifier)
                .clean()
                .to_string_lossy()
                .into_owned()
        } else {
            self.specifier.clone()
        }
    }
}

/// Process-wide build configuration.
///
/// Constructed once per invocation by [`crate::load`] and passed by reference
/// afterwards; nothing mutates it after loading apart from the explicit
/// `with_*` overrides applied by the CLI before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Entry scripts, in configured order.
    pub entries: Vec<PathBuf>,
    /// Plugins, in configured order.
    pub plugins: Vec<PluginDescriptor>,
    pub bundle_mode: BundleMode,
    /// Extra driver package prefixes on top of the built-in list.
    pub drivers: Vec<String>,
    /// Automation engine name (`puppeteer`, `playwright`, ...).
    pub engine: String,
    pub headless: bool,
    /// Upper bound for a single plugin hook.
    pub timeout: Duration,
    pub viewport: Viewport,
    pub out_dir: PathBuf,
    /// Directory relative entries and plugins resolve against.
    pub root: PathBuf,
}

impl BuildConfig {
    /// Defaults rooted at `root`.
    pub fn defaults(root: impl Into<PathBuf>) -> Self {
        Self {
            entries: vec![PathBuf::from(DEFAULT_ENTRY)],
            plugins: Vec::new(),
            bundle_mode: BundleMode::default(),
            drivers: Vec::new(),
            engine: default_engine(),
            headless: true,
            timeout: default_timeout(),
            viewport: Viewport::default(),
            out_dir: default_out_dir(),
            root: root.into(),
        }
    }

    pub fn with_bundle_mode(mut self, mode: BundleMode) -> Self {
        self.bundle_mode = mode;
        self
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    /// Output directory resolved against the project root.
    pub fn resolved_out_dir(&self) -> PathBuf {
        self.root.join(&self.out_dir).clean()
    }

    /// Plugin import paths in configured order.
    pub fn plugin_import_paths(&self) -> Vec<String> {
        let mut plugins = self.plugins.clone();
        plugins.sort_by_key(|p| p.ordinal);
        plugins.iter().map(|p| p.import_path(&self.root)).collect()
    }
}

pub fn default_engine() -> String {
    "puppeteer".to_string()
}

pub fn default_timeout() -> Duration {
    Duration::from_millis(30_000)
}

pub fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}
