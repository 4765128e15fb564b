//! The `virtual:phantom-plugins` aggregation module.
//!
//! Entry scripts import `{ plugins }` from this id without knowing which
//! plugins are configured. The module text is synthesized from the plugin
//! list at load time and cached for the rest of the build.

use std::fmt::Write as _;

use once_cell::sync::OnceCell;
use phantom_config::{LoadedConfig, PluginListStatus};
use tracing::{debug, warn};

/// Id that scripts import.
pub const PUBLIC_ID: &str = "virtual:phantom-plugins";

/// Id the bundler sees after resolution. The NUL prefix keeps other
/// resolvers and loaders away from it.
pub const RESOLVED_ID: &str = "\0virtual:phantom-plugins";

/// A module that exists only inside the bundler.
pub trait VirtualModule: Send + Sync {
    /// Resolved id for `requested`, or `None` to let other resolvers try.
    fn resolve(&self, requested: &str) -> Option<String>;

    /// Source text for a previously resolved id.
    fn load(&self, resolved: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualModuleRecord {
    pub id: String,
    pub source: String,
}

/// Why the synthesized module exports an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// The configuration or its plugin list could not be read.
    ConfigUnreadable(String),
    /// The configuration has no `plugins` key.
    PluginListAbsent,
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degradation::ConfigUnreadable(reason) => {
                write!(f, "plugin list unreadable ({})", reason)
            }
            Degradation::PluginListAbsent => f.write_str("no plugin list configured"),
        }
    }
}

/// Render the aggregation module for plugins given by import path, in order.
pub fn render_source(import_paths: &[String]) -> String {
    let mut source = String::new();
    for (index, path) in import_paths.iter().enumerate() {
        let quoted = serde_json::Value::String(path.clone()).to_string();
        let _ = writeln!(source, "import * as plugin{} from {};", index, quoted);
    }
    if !import_paths.is_empty() {
        source.push('\n');
    }
    let names = (0..import_paths.len())
        .map(|index| format!("plugin{}", index))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(source, "export const plugins = [{}];", names);
    source
}

/// Synthesizer for one build.
#[derive(Debug)]
pub struct VirtualPluginModule {
    import_paths: Vec<String>,
    degradation: Option<Degradation>,
    record: OnceCell<VirtualModuleRecord>,
}

impl VirtualPluginModule {
    /// Aggregate plugins given by import path.
    pub fn new(import_paths: Vec<String>) -> Self {
        Self {
            import_paths,
            degradation: None,
            record: OnceCell::new(),
        }
    }

    /// A module that always exports an empty list and warns once on load.
    pub fn degraded(reason: Degradation) -> Self {
        Self {
            import_paths: Vec::new(),
            degradation: Some(reason),
            record: OnceCell::new(),
        }
    }

    pub fn from_config(loaded: &LoadedConfig) -> Self {
        match &loaded.plugins {
            PluginListStatus::Declared => Self::new(loaded.config.plugin_import_paths()),
            PluginListStatus::Absent => Self::degraded(Degradation::PluginListAbsent),
            PluginListStatus::Unreadable(reason) => {
                Self::degraded(Degradation::ConfigUnreadable(reason.clone()))
            }
        }
    }

    pub fn degradation(&self) -> Option<&Degradation> {
        self.degradation.as_ref()
    }

    pub fn plugin_count(&self) -> usize {
        self.import_paths.len()
    }

    /// The synthesized record, built on first use.
    pub fn record(&self) -> &VirtualModuleRecord {
        self.record.get_or_init(|| {
            if let Some(reason) = &self.degradation {
                warn!("Plugin module degraded to an empty list: {}", reason);
            }
            let source = render_source(&self.import_paths);
            debug!(plugins = self.import_paths.len(), "Synthesized {}", PUBLIC_ID);
            VirtualModuleRecord {
                id: RESOLVED_ID.to_string(),
                source,
            }
        })
    }
}

impl VirtualModule for VirtualPluginModule {
    fn resolve(&self, requested: &str) -> Option<String> {
        (requested == PUBLIC_ID || requested == RESOLVED_ID).then(|| RESOLVED_ID.to_string())
    }

    fn load(&self, resolved: &str) -> Option<String> {
        (resolved == RESOLVED_ID).then(|| self.record().source.clone())
    }
}
