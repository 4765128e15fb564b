//! Rolldown plugins and their ordering.

mod aggregate_plugin;
mod externals_plugin;
mod registry;

pub use aggregate_plugin::PluginAggregatePlugin;
pub use externals_plugin::ExternalsPlugin;
pub use registry::{PhantomPlugin, PluginPhase, PluginRegistry};
