//! Plugin lifecycle for Phantom automation sessions.
//!
//! Plugins implement any subset of `on_start`, `on_page_load` and `on_exit`
//! ([`LifecyclePlugin`], or [`PluginModule`] for closures). A
//! [`LifecycleDispatcher`] opens [`Session`]s that call those hooks in
//! configured order, one at a time, isolating each plugin's failures from
//! the others. [`render_runner`] emits the engine script that calls the
//! same hooks from JavaScript.

pub mod builtin;
mod context;
mod dispatcher;
mod loader;
mod page;
mod plugin;
mod runner;

pub use context::{
    LifecycleContext, SessionMeta, UNKNOWN_COMMAND, UNKNOWN_ENGINE, UNKNOWN_URL, command_of, url_of,
};
pub use dispatcher::{
    DispatchError, FailureKind, LifecycleDispatcher, PluginHookFailure, RegisteredPlugin, Session,
    SessionReport, SessionState, StageReport,
};
pub use loader::{LoadError, LoadOutcome, PluginFactory, PluginLoadFailure, PluginLoader, PluginSource};
pub use page::{PageHandle, PageSnapshot};
pub use plugin::{Hook, HookResult, HookSet, LifecyclePlugin, PluginModule};
pub use runner::{Engine, RunnerError, RunnerScript, render_runner};
