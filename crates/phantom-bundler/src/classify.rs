//! Deciding which bare imports stay external at run time.

use once_cell::sync::Lazy;
use phantom_config::{BuildConfig, BundleMode};
use rustc_hash::FxHashSet;

/// Node.js core modules, without the `node:` scheme.
const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

static BUILTIN_SET: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| NODE_BUILTINS.iter().copied().collect());

/// Package prefixes of the supported automation drivers.
pub const DEFAULT_DRIVER_PREFIXES: &[&str] = &[
    "puppeteer",
    "playwright",
    "@puppeteer/",
    "@playwright/",
    "selenium-webdriver",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    External,
    Bundled,
}

/// Whether `id` names a platform built-in.
///
/// `fs`, `node:fs`, `fs/promises` and `node:fs/promises` are all built-ins;
/// `node:` ids are built-ins even when the module is unknown to this list.
pub fn is_builtin(id: &str) -> bool {
    if let Some(rest) = id.strip_prefix("node:") {
        return !rest.is_empty();
    }
    let head = id.split('/').next().unwrap_or(id);
    BUILTIN_SET.contains(head)
}

/// Pure classifier over a fixed driver prefix list.
#[derive(Debug, Clone)]
pub struct DependencyClassifier {
    driver_prefixes: Vec<String>,
}

impl Default for DependencyClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyClassifier {
    pub fn new() -> Self {
        Self {
            driver_prefixes: DEFAULT_DRIVER_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Default drivers plus `extra` prefixes.
    pub fn with_drivers<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classifier = Self::new();
        for prefix in extra {
            let prefix = prefix.into();
            if !prefix.is_empty() && !classifier.driver_prefixes.contains(&prefix) {
                classifier.driver_prefixes.push(prefix);
            }
        }
        classifier
    }

    pub fn from_config(config: &BuildConfig) -> Self {
        Self::with_drivers(config.drivers.iter().cloned())
    }

    pub fn driver_prefixes(&self) -> &[String] {
        &self.driver_prefixes
    }

    pub fn is_driver(&self, id: &str) -> bool {
        self.driver_prefixes
            .iter()
            .any(|prefix| id.starts_with(prefix.as_str()))
    }

    pub fn classify(&self, id: &str, mode: BundleMode) -> Classification {
        if is_builtin(id) {
            return Classification::External;
        }
        match mode {
            BundleMode::ExternalizeDrivers if self.is_driver(id) => Classification::External,
            _ => Classification::Bundled,
        }
    }
}
