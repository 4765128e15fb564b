//! Configuration for Phantom builds.
//!
//! A [`BuildConfig`] is produced once per invocation by [`load`] and then
//! passed by reference into the entry resolver, the plugin synthesizer and the
//! lifecycle dispatcher.

mod config;
mod env;
mod error;
mod loading;

pub use config::{
    BuildConfig, BundleMode, CONFIG_FILE_NAME, DEFAULT_ENTRY, PluginDescriptor, Viewport,
    default_engine, default_out_dir, default_timeout,
};
pub use env::ENV_PREFIX;
pub use error::{ConfigError, Result};
pub use loading::{LoadedConfig, PluginListStatus, load};
