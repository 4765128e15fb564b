//! Serves a [`VirtualModule`] to Rolldown.

use std::borrow::Cow;
use std::sync::Arc;

use rolldown_common::{ModuleType, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};

use crate::plugins::{PhantomPlugin, PluginPhase};
use crate::virtual_plugins::VirtualModule;

/// Bridges the `resolve`/`load` pair of a virtual module to Rolldown hooks.
#[derive(Clone)]
pub struct PluginAggregatePlugin {
    module: Arc<dyn VirtualModule>,
}

impl PluginAggregatePlugin {
    pub fn new(module: Arc<dyn VirtualModule>) -> Self {
        Self { module }
    }
}

impl std::fmt::Debug for PluginAggregatePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginAggregatePlugin").finish_non_exhaustive()
    }
}

impl Plugin for PluginAggregatePlugin {
    fn name(&self) -> Cow<'static, str> {
        "phantom-virtual-plugins".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs<'_>,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let resolved = self.module.resolve(args.specifier);

        async move {
            Ok(resolved.map(|id| HookResolveIdOutput {
                id: id.into(),
                external: Some(ResolvedExternal::Bool(false)),
                ..Default::default()
            }))
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let source = self.module.load(args.id);

        async move {
            Ok(source.map(|code| HookLoadOutput {
                code: code.into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}

impl PhantomPlugin for PluginAggregatePlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Virtual
    }
}
