//! Plugin registry with execution phases.
//!
//! Rolldown asks plugins in registration order, so the registry sorts them
//! by phase before handing them over.

use std::sync::Arc;

use rolldown_plugin::Plugin;

use crate::SharedPluginable;

/// Plugin execution phases, lower numbers first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PluginPhase {
    /// Modules that don't exist on disk. Must claim their ids before any
    /// other resolver sees them.
    Virtual = 0,

    /// Module resolution, including externalization.
    Resolve = 10,
}

/// A Rolldown plugin that knows its phase.
pub trait PhantomPlugin: Plugin {
    fn phase(&self) -> PluginPhase;
}

/// Plugin registry that maintains plugins in phase order
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<(PluginPhase, SharedPluginable)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin. Sorting happens once in `into_rolldown_plugins()`.
    pub fn add<P: PhantomPlugin + 'static>(&mut self, plugin: P) {
        let phase = plugin.phase();
        let plugin_arc: SharedPluginable = Arc::new(plugin);
        self.plugins.push((phase, plugin_arc));
    }

    /// Phases of the registered plugins, in the order they will run.
    pub fn phases(&self) -> Vec<PluginPhase> {
        let mut phases: Vec<_> = self.plugins.iter().map(|(phase, _)| *phase).collect();
        phases.sort();
        phases
    }

    /// Convert to Rolldown plugins in phase order.
    ///
    /// The sort is stable, so plugins of the same phase keep insertion order.
    pub fn into_rolldown_plugins(mut self) -> Vec<SharedPluginable> {
        self.plugins.sort_by_key(|(phase, _)| *phase);
        self.plugins.into_iter().map(|(_, plugin)| plugin).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::DependencyClassifier;
    use crate::plugins::{ExternalsPlugin, PluginAggregatePlugin};
    use crate::virtual_plugins::VirtualPluginModule;
    use phantom_config::BundleMode;

    #[test]
    fn virtual_runs_before_resolve() {
        let mut registry = PluginRegistry::new();
        registry.add(ExternalsPlugin::new(
            Arc::new(DependencyClassifier::new()),
            BundleMode::ExternalizeBuiltins,
        ));
        registry.add(PluginAggregatePlugin::new(Arc::new(VirtualPluginModule::new(
            Vec::new(),
        ))));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.phases(), vec![PluginPhase::Virtual, PluginPhase::Resolve]);
        assert_eq!(registry.into_rolldown_plugins().len(), 2);
    }
}
