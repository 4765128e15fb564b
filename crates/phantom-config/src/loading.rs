//! Reading `phantomvite.config.json` with per-field fallbacks.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{BuildConfig, BundleMode, CONFIG_FILE_NAME, PluginDescriptor, Viewport};
use crate::env::apply_env_overrides;
use crate::error::ConfigError;

/// What the configuration said about the plugin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginListStatus {
    /// A `plugins` array was present and well formed (possibly empty).
    Declared,
    /// The file was readable but had no `plugins` key.
    Absent,
    /// The file or the `plugins` value could not be used.
    Unreadable(String),
}

impl PluginListStatus {
    pub fn is_declared(&self) -> bool {
        matches!(self, PluginListStatus::Declared)
    }
}

/// Result of [`load`]: a usable configuration plus everything that went wrong
/// while producing it.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: BuildConfig,
    pub plugins: PluginListStatus,
    /// Non-fatal problems, in the order they were found.
    pub warnings: Vec<ConfigError>,
    /// The file that was read, or would have been.
    pub source: PathBuf,
}

impl LoadedConfig {
    /// Whether the file itself was unusable and defaults were substituted.
    pub fn used_defaults(&self) -> bool {
        self.warnings.iter().any(ConfigError::is_file_level)
    }
}

/// Load the configuration for `root`.
///
/// `path` defaults to `root/phantomvite.config.json`; a relative `path` is
/// taken relative to `root`. This never fails: a missing or malformed file
/// yields the defaults and a warning, a mistyped key keeps its default and
/// yields a warning, and `PHANTOM_*` environment variables are applied last.
pub fn load(path: Option<&Path>, root: &Path) -> LoadedConfig {
    let source = match path {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => root.join(p),
        None => root.join(CONFIG_FILE_NAME),
    };

    let mut warnings = Vec::new();
    let (mut config, plugins) = match read_document(&source) {
        Ok(Value::Object(object)) => from_object(&object, root, &mut warnings),
        Ok(other) => {
            let err = ConfigError::InvalidField {
                field: "<root>".to_string(),
                message: format!("expected an object, found {}", type_name(&other)),
            };
            let reason = err.to_string();
            warnings.push(err);
            (BuildConfig::defaults(root), PluginListStatus::Unreadable(reason))
        }
        Err(err) => {
            let reason = err.to_string();
            warnings.push(err);
            (BuildConfig::defaults(root), PluginListStatus::Unreadable(reason))
        }
    };

    apply_env_overrides(&mut config, &mut warnings);

    for warning in &warnings {
        warn!("{}", warning);
    }
    debug!(
        config = %source.display(),
        entries = config.entries.len(),
        plugins = config.plugins.len(),
        "Loaded configuration"
    );

    LoadedConfig {
        config,
        plugins,
        warnings,
        source,
    }
}

fn read_document(path: &Path) -> Result<Value, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build a configuration from a parsed document, one key at a time.
pub(crate) fn from_object(
    object: &Map<String, Value>,
    root: &Path,
    warnings: &mut Vec<ConfigError>,
) -> (BuildConfig, PluginListStatus) {
    let mut config = BuildConfig::defaults(root);

    if let Some(entries) = resolve_entry_list(object, warnings) {
        config.entries = entries.into_iter().map(PathBuf::from).collect();
    }

    let plugins = match object.get("plugins") {
        None => PluginListStatus::Absent,
        Some(value) => match serde_json::from_value::<Vec<String>>(value.clone()) {
            Ok(specifiers) => {
                config.plugins = PluginDescriptor::from_specifiers(specifiers);
                PluginListStatus::Declared
            }
            Err(_) => {
                let err = invalid("plugins", "expected an array of strings", value);
                let reason = err.to_string();
                warnings.push(err);
                PluginListStatus::Unreadable(reason)
            }
        },
    };

    if let Some(mode) = field::<BundleMode>(object, "bundleMode", warnings) {
        config.bundle_mode = mode;
    }
    if let Some(drivers) = field::<Vec<String>>(object, "drivers", warnings) {
        config.drivers = drivers;
    }
    if let Some(engine) = field::<String>(object, "engine", warnings) {
        if engine.trim().is_empty() {
            warnings.push(invalid("engine", "must not be empty", &Value::String(engine)));
        } else {
            config.engine = engine;
        }
    }
    if let Some(headless) = field::<bool>(object, "headless", warnings) {
        config.headless = headless;
    }
    if let Some(timeout) = field::<u64>(object, "timeout", warnings) {
        if timeout == 0 {
            warnings.push(invalid("timeout", "must be greater than zero", &Value::from(0)));
        } else {
            config.timeout = std::time::Duration::from_millis(timeout);
        }
    }
    if let Some(viewport) = field::<Viewport>(object, "viewport", warnings) {
        config.viewport = viewport;
    }
    if let Some(out_dir) = field::<PathBuf>(object, "outDir", warnings) {
        config.out_dir = out_dir;
    }

    (config, plugins)
}

/// `entries` (array) wins over `entry` (array), which wins over `entry`
/// (string). `None` means neither was usable.
fn resolve_entry_list(
    object: &Map<String, Value>,
    warnings: &mut Vec<ConfigError>,
) -> Option<Vec<String>> {
    if let Some(entries) = field::<Vec<String>>(object, "entries", warnings) {
        return Some(entries);
    }
    match object.get("entry") {
        None => None,
        Some(Value::String(single)) => Some(vec![single.clone()]),
        Some(value) => match serde_json::from_value::<Vec<String>>(value.clone()) {
            Ok(list) => Some(list),
            Err(_) => {
                warnings.push(invalid(
                    "entry",
                    "expected a string or an array of strings",
                    value,
                ));
                None
            }
        },
    }
}

fn field<T: DeserializeOwned>(
    object: &Map<String, Value>,
    key: &str,
    warnings: &mut Vec<ConfigError>,
) -> Option<T> {
    let value = object.get(key)?;
    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warnings.push(ConfigError::InvalidField {
                field: key.to_string(),
                message: err.to_string(),
            });
            None
        }
    }
}

fn invalid(field: &str, expected: &str, found: &Value) -> ConfigError {
    ConfigError::InvalidField {
        field: field.to_string(),
        message: format!("{}, found {}", expected, type_name(found)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
