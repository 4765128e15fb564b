//! Marks classifier externals as external during resolution.

use std::borrow::Cow;
use std::sync::Arc;

use phantom_config::BundleMode;
use rolldown_common::ResolvedExternal;
use rolldown_plugin::{
    HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};
use tracing::trace;

use crate::classify::{Classification, DependencyClassifier};
use crate::plugins::{PhantomPlugin, PluginPhase};

#[derive(Debug, Clone)]
pub struct ExternalsPlugin {
    classifier: Arc<DependencyClassifier>,
    mode: BundleMode,
}

impl ExternalsPlugin {
    pub fn new(classifier: Arc<DependencyClassifier>, mode: BundleMode) -> Self {
        Self { classifier, mode }
    }

    /// Only bare specifiers are candidates; relative, absolute and virtual
    /// ids always go to the regular resolver.
    fn is_external(&self, specifier: &str) -> bool {
        if specifier.is_empty()
            || specifier.starts_with('.')
            || specifier.starts_with('/')
            || specifier.starts_with('\0')
            || specifier.starts_with("virtual:")
            || std::path::Path::new(specifier).is_absolute()
        {
            return false;
        }
        self.classifier.classify(specifier, self.mode) == Classification::External
    }
}

impl Plugin for ExternalsPlugin {
    fn name(&self) -> Cow<'static, str> {
        "phantom-externals".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs<'_>,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let external = self.is_external(&specifier);

        async move {
            if !external {
                return Ok(None);
            }
            trace!(specifier = %specifier, "Externalized");
            Ok(Some(HookResolveIdOutput {
                id: specifier.into(),
                external: Some(ResolvedExternal::Bool(true)),
                ..Default::default()
            }))
        }
    }
}

impl PhantomPlugin for ExternalsPlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Resolve
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_bare_specifiers_are_candidates() {
        let plugin = ExternalsPlugin::new(
            Arc::new(DependencyClassifier::new()),
            BundleMode::ExternalizeDrivers,
        );
        assert!(plugin.is_external("fs"));
        assert!(plugin.is_external("node:path"));
        assert!(plugin.is_external("puppeteer"));
        assert!(!plugin.is_external("lodash"));
        assert!(!plugin.is_external("./fs"));
        assert!(!plugin.is_external("/abs/puppeteer"));
        assert!(!plugin.is_external("\0virtual:phantom-plugins"));
        assert!(!plugin.is_external("virtual:phantom-plugins"));
    }

    #[test]
    fn bundle_everything_keeps_drivers_inside() {
        let plugin = ExternalsPlugin::new(
            Arc::new(DependencyClassifier::new()),
            BundleMode::BundleEverything,
        );
        assert!(plugin.is_external("fs/promises"));
        assert!(!plugin.is_external("playwright"));
    }
}
