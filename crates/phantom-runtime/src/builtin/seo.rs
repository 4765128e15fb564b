use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::context::LifecycleContext;
use crate::page::PageHandle;
use crate::plugin::{Hook, HookResult, HookSet, LifecyclePlugin};

/// Something the SEO check did not like about a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeoFinding {
    MissingTitle { url: String },
    MissingDescription { url: String },
}

/// Checks every loaded page for a title and a meta description.
#[derive(Debug, Default)]
pub struct SeoPlugin {
    findings: Mutex<Vec<SeoFinding>>,
}

impl SeoPlugin {
    pub const NAME: &'static str = "seo";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn findings(&self) -> Vec<SeoFinding> {
        self.findings.lock().clone()
    }
}

#[async_trait]
impl LifecyclePlugin for SeoPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn hooks(&self) -> HookSet {
        HookSet::NONE.with(Hook::Start).with(Hook::PageLoad)
    }

    async fn on_start(&self, context: Option<&LifecycleContext>) -> HookResult {
        match context {
            None => warn!(plugin = Self::NAME, "No context provided to onStart"),
            Some(ctx) => match ctx.engine() {
                None => warn!(plugin = Self::NAME, "No engine found in context"),
                Some(engine) => info!(plugin = Self::NAME, "Initialized with engine: {}", engine),
            },
        }
        Ok(())
    }

    async fn on_page_load(&self, page: Arc<dyn PageHandle>) -> HookResult {
        let url = page.url();
        let title = page.title().await?;
        let content = page.content().await?;

        let mut found = Vec::new();
        if title.trim().is_empty() {
            found.push(SeoFinding::MissingTitle { url: url.clone() });
        }
        if !has_meta_description(&content) {
            found.push(SeoFinding::MissingDescription { url });
        }
        for finding in &found {
            warn!(plugin = Self::NAME, "{:?}", finding);
        }
        self.findings.lock().extend(found);
        Ok(())
    }
}

fn has_meta_description(html: &str) -> bool {
    let lower = html.to_ascii_lowercase();
    lower.contains("name=\"description\"") || lower.contains("name='description'")
}
