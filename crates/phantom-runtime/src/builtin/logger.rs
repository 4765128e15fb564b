use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::context::{LifecycleContext, UNKNOWN_ENGINE, command_of, url_of};
use crate::page::PageHandle;
use crate::plugin::{HookResult, LifecyclePlugin};

/// Logs the session as it progresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerPlugin;

impl LoggerPlugin {
    pub const NAME: &'static str = "logger";

    /// The line logged on start: `command`, `engine` and `url`, with
    /// placeholders for anything missing.
    pub fn start_summary(context: Option<&LifecycleContext>) -> String {
        let engine = context
            .and_then(LifecycleContext::engine)
            .unwrap_or(UNKNOWN_ENGINE);
        format!(
            "command: {}, engine: {}, url: {}",
            command_of(context),
            engine,
            url_of(context)
        )
    }
}

#[async_trait]
impl LifecyclePlugin for LoggerPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn on_start(&self, context: Option<&LifecycleContext>) -> HookResult {
        if context.is_none() {
            warn!(plugin = Self::NAME, "No context");
        }
        info!(plugin = Self::NAME, "onStart {}", Self::start_summary(context));
        Ok(())
    }

    async fn on_page_load(&self, page: Arc<dyn PageHandle>) -> HookResult {
        let title = page.title().await?;
        info!(plugin = Self::NAME, url = %page.url(), "Page loaded: {}", title);
        Ok(())
    }

    async fn on_exit(&self) -> HookResult {
        info!(plugin = Self::NAME, "Session finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_uses_placeholders() {
        assert_eq!(
            LoggerPlugin::start_summary(None),
            "command: unknown, engine: unknown, url: N/A"
        );

        let ctx = LifecycleContext::new("puppeteer").with_url("https://example.com");
        assert_eq!(
            LoggerPlugin::start_summary(Some(&ctx)),
            "command: unknown, engine: puppeteer, url: https://example.com"
        );
    }

    #[tokio::test]
    async fn absent_context_does_not_fail() {
        assert!(LoggerPlugin.on_start(None).await.is_ok());
        assert!(LoggerPlugin.on_exit().await.is_ok());
    }
}
