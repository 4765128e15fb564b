//! Read-only session data handed to `on_start`.

use phantom_config::BuildConfig;

/// Shown when the session has no command.
pub const UNKNOWN_COMMAND: &str = "unknown";

/// Shown when the context names no engine.
pub const UNKNOWN_ENGINE: &str = "unknown";

/// Shown when the session has no target URL.
pub const UNKNOWN_URL: &str = "N/A";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionMeta {
    /// CLI command that started the session (`open`, `agent`, ...).
    pub command: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleContext {
    pub engine: String,
    pub meta: SessionMeta,
}

impl LifecycleContext {
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            meta: SessionMeta::default(),
        }
    }

    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(config.engine.clone())
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.meta.command = Some(command.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.meta.url = Some(url.into());
        self
    }

    pub fn command(&self) -> &str {
        non_empty(self.meta.command.as_deref()).unwrap_or(UNKNOWN_COMMAND)
    }

    pub fn url(&self) -> &str {
        non_empty(self.meta.url.as_deref()).unwrap_or(UNKNOWN_URL)
    }

    /// Engine name, or `None` when it was left blank.
    pub fn engine(&self) -> Option<&str> {
        non_empty(Some(self.engine.as_str()))
    }
}

/// Command of an optional context, for display.
pub fn command_of(context: Option<&LifecycleContext>) -> &str {
    context.map_or(UNKNOWN_COMMAND, LifecycleContext::command)
}

/// URL of an optional context, for display.
pub fn url_of(context: Option<&LifecycleContext>) -> &str {
    context.map_or(UNKNOWN_URL, LifecycleContext::url)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
