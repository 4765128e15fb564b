//! Mapping configured plugin descriptors to plugin objects.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use phantom_config::{BuildConfig, PluginDescriptor};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::builtin::{LoggerPlugin, SeoPlugin};
use crate::dispatcher::{LifecycleDispatcher, RegisteredPlugin};
use crate::plugin::LifecyclePlugin;

/// Builds a fresh plugin instance.
pub type PluginFactory =
    Arc<dyn Fn() -> anyhow::Result<Arc<dyn LifecyclePlugin>> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("plugin file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("no plugin registered for '{0}'")]
    NotRegistered(String),

    #[error("plugin failed to initialize: {0}")]
    Init(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginLoadFailure {
    pub ordinal: usize,
    pub specifier: String,
    pub error: LoadError,
}

/// Where a descriptor points, without loading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSource {
    /// A factory is registered under this name.
    Registered(String),
    File(PathBuf),
    MissingFile(PathBuf),
    Package(String),
}

#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Loaded plugins, in ordinal order.
    pub plugins: Vec<RegisteredPlugin>,
    pub failures: Vec<PluginLoadFailure>,
}

impl LoadOutcome {
    pub fn into_dispatcher(self) -> LifecycleDispatcher {
        LifecycleDispatcher::from_registered(self.plugins)
    }
}

/// Registry of plugin factories keyed by specifier or plugin name.
///
/// A descriptor matches a factory registered under its exact specifier, or
/// under its file stem (`./plugins/logger.js` matches `logger`).
#[derive(Clone)]
pub struct PluginLoader {
    root: PathBuf,
    factories: FxHashMap<String, PluginFactory>,
}

impl std::fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("PluginLoader")
            .field("root", &self.root)
            .field("factories", &names)
            .finish()
    }
}

impl PluginLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            factories: FxHashMap::default(),
        }
    }

    /// A loader that knows the bundled `logger` and `seo` plugins.
    pub fn with_builtins(root: impl Into<PathBuf>) -> Self {
        let mut loader = Self::new(root);
        let logger: PluginFactory =
            Arc::new(|| -> anyhow::Result<Arc<dyn LifecyclePlugin>> { Ok(Arc::new(LoggerPlugin)) });
        let seo: PluginFactory =
            Arc::new(|| -> anyhow::Result<Arc<dyn LifecyclePlugin>> { Ok(Arc::new(SeoPlugin::new())) });
        loader.register(LoggerPlugin::NAME, logger);
        loader.register(SeoPlugin::NAME, seo);
        loader
    }

    pub fn register(&mut self, key: impl Into<String>, factory: PluginFactory) {
        self.factories.insert(key.into(), factory);
    }

    fn factory_for(&self, descriptor: &PluginDescriptor) -> Option<(&str, &PluginFactory)> {
        if let Some((key, factory)) = self.factories.get_key_value(&descriptor.specifier) {
            return Some((key.as_str(), factory));
        }
        let stem = plugin_stem(&descriptor.specifier)?;
        self.factories
            .get_key_value(stem)
            .map(|(key, factory)| (key.as_str(), factory))
    }

    pub fn inspect(&self, descriptor: &PluginDescriptor) -> PluginSource {
        if let Some((key, _)) = self.factory_for(descriptor) {
            return PluginSource::Registered(key.to_string());
        }
        if descriptor.is_path() {
            let path = PathBuf::from(descriptor.import_path(&self.root));
            if path.is_file() {
                PluginSource::File(path)
            } else {
                PluginSource::MissingFile(path)
            }
        } else {
            PluginSource::Package(descriptor.specifier.clone())
        }
    }

    /// Instantiate every descriptor that has a factory.
    ///
    /// Descriptors that cannot be loaded are reported and skipped; the rest
    /// keep their ordinals and relative order.
    pub fn load(&self, descriptors: &[PluginDescriptor]) -> LoadOutcome {
        let mut ordered: Vec<&PluginDescriptor> = descriptors.iter().collect();
        ordered.sort_by_key(|d| d.ordinal);

        let mut outcome = LoadOutcome::default();
        for descriptor in ordered {
            match self.load_one(descriptor) {
                Ok(plugin) => {
                    debug!(
                        ordinal = descriptor.ordinal,
                        plugin = plugin.name(),
                        "Loaded plugin"
                    );
                    outcome.plugins.push(RegisteredPlugin {
                        ordinal: descriptor.ordinal,
                        plugin,
                    });
                }
                Err(error) => {
                    warn!("Skipping plugin '{}': {}", descriptor.specifier, error);
                    outcome.failures.push(PluginLoadFailure {
                        ordinal: descriptor.ordinal,
                        specifier: descriptor.specifier.clone(),
                        error,
                    });
                }
            }
        }
        outcome
    }

    /// Load `config.plugins` into a dispatcher whose hooks are bounded by
    /// `config.timeout`.
    pub fn dispatcher_for(
        &self,
        config: &BuildConfig,
    ) -> (LifecycleDispatcher, Vec<PluginLoadFailure>) {
        let outcome = self.load(&config.plugins);
        let failures = outcome.failures.clone();
        let dispatcher = outcome.into_dispatcher().with_hook_timeout(config.timeout);
        (dispatcher, failures)
    }

    fn load_one(
        &self,
        descriptor: &PluginDescriptor,
    ) -> Result<Arc<dyn LifecyclePlugin>, LoadError> {
        if let Some((_, factory)) = self.factory_for(descriptor) {
            return factory().map_err(|e| LoadError::Init(format!("{:#}", e)));
        }
        match self.inspect(descriptor) {
            PluginSource::MissingFile(path) => Err(LoadError::FileNotFound(path)),
            _ => Err(LoadError::NotRegistered(descriptor.specifier.clone())),
        }
    }
}

fn plugin_stem(specifier: &str) -> Option<&str> {
    Path::new(specifier).file_stem().and_then(|s| s.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_match_by_stem() {
        let loader = PluginLoader::with_builtins("/project");
        let descriptors =
            PluginDescriptor::from_specifiers(["./plugins/logger.js", "seo", "./plugins/other.js"]);

        assert_eq!(
            loader.inspect(&descriptors[0]),
            PluginSource::Registered("logger".to_string())
        );
        assert_eq!(
            loader.inspect(&descriptors[1]),
            PluginSource::Registered("seo".to_string())
        );
        assert_eq!(
            loader.inspect(&descriptors[2]),
            PluginSource::MissingFile(PathBuf::from("/project/plugins/other.js"))
        );
    }

    #[test]
    fn failures_are_skipped_and_order_kept() {
        let mut loader = PluginLoader::with_builtins("/project");
        let broken: PluginFactory = Arc::new(|| -> anyhow::Result<Arc<dyn LifecyclePlugin>> {
            Err(anyhow::anyhow!("missing dependency"))
        });
        loader.register("broken", broken);
        let descriptors = PluginDescriptor::from_specifiers([
            "seo",
            "broken",
            "phantom-plugin-unknown",
            "./plugins/logger.js",
        ]);

        let outcome = loader.load(&descriptors);
        let loaded: Vec<_> = outcome
            .plugins
            .iter()
            .map(|p| (p.ordinal, p.plugin.name().to_string()))
            .collect();
        assert_eq!(
            loaded,
            vec![(0, "seo".to_string()), (3, "logger".to_string())]
        );
        assert_eq!(outcome.failures.len(), 2);
        assert!(matches!(outcome.failures[0].error, LoadError::Init(_)));
        assert_eq!(
            outcome.failures[1].error,
            LoadError::NotRegistered("phantom-plugin-unknown".to_string())
        );
    }

    #[test]
    fn dispatcher_for_uses_configured_plugins_and_timeout() {
        let mut config = BuildConfig::defaults("/project");
        config.plugins = PluginDescriptor::from_specifiers(["logger", "./plugins/gone.js"]);
        config.timeout = std::time::Duration::from_millis(250);

        let (dispatcher, failures) = PluginLoader::with_builtins("/project").dispatcher_for(&config);
        assert_eq!(dispatcher.plugins().len(), 1);
        assert_eq!(
            dispatcher.hook_timeout(),
            Some(std::time::Duration::from_millis(250))
        );
        assert_eq!(
            failures[0].error,
            LoadError::FileNotFound(PathBuf::from("/project/plugins/gone.js"))
        );
    }
}
