//! `PHANTOM_*` environment overrides.

use std::path::PathBuf;

use figment::Figment;
use figment::providers::Env;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{BuildConfig, BundleMode};
use crate::error::ConfigError;

pub const ENV_PREFIX: &str = "PHANTOM_";

/// Apply `PHANTOM_ENGINE`, `PHANTOM_BUNDLE_MODE`, `PHANTOM_OUT_DIR` and
/// `PHANTOM_TIMEOUT` on top of `config`.
pub(crate) fn apply_env_overrides(config: &mut BuildConfig, warnings: &mut Vec<ConfigError>) {
    apply_overrides_from(&Figment::from(Env::prefixed(ENV_PREFIX)), config, warnings);
}

pub(crate) fn apply_overrides_from(
    figment: &Figment,
    config: &mut BuildConfig,
    warnings: &mut Vec<ConfigError>,
) {
    if let Some(engine) = extract::<String>(figment, "engine", warnings) {
        if !engine.trim().is_empty() {
            config.engine = engine;
        }
    }
    if let Some(mode) = extract::<String>(figment, "bundle_mode", warnings) {
        match mode.parse::<BundleMode>() {
            Ok(mode) => config.bundle_mode = mode,
            Err(message) => warnings.push(ConfigError::Env {
                var: env_name("bundle_mode"),
                message,
            }),
        }
    }
    if let Some(out_dir) = extract::<PathBuf>(figment, "out_dir", warnings) {
        config.out_dir = out_dir;
    }
    if let Some(timeout) = extract::<u64>(figment, "timeout", warnings) {
        if timeout == 0 {
            warnings.push(ConfigError::Env {
                var: env_name("timeout"),
                message: "must be greater than zero".to_string(),
            });
        } else {
            config.timeout = std::time::Duration::from_millis(timeout);
        }
    }
}

fn extract<T: DeserializeOwned>(
    figment: &Figment,
    key: &str,
    warnings: &mut Vec<ConfigError>,
) -> Option<T> {
    if !figment.contains(key) {
        return None;
    }
    match figment.extract_inner::<T>(key) {
        Ok(value) => {
            debug!(var = %env_name(key), "Applied environment override");
            Some(value)
        }
        Err(err) => {
            warnings.push(ConfigError::Env {
                var: env_name(key),
                message: err.to_string(),
            });
            None
        }
    }
}

fn env_name(key: &str) -> String {
    format!("{}{}", ENV_PREFIX, key.to_uppercase())
}
