//! The page object passed to `on_page_load`.

use async_trait::async_trait;

/// A loaded page as seen by plugins.
#[async_trait]
pub trait PageHandle: Send + Sync {
    fn url(&self) -> String;

    async fn title(&self) -> anyhow::Result<String>;

    async fn content(&self) -> anyhow::Result<String>;
}

/// A page captured ahead of time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    pub content: String,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content: String::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

#[async_trait]
impl PageHandle for PageSnapshot {
    fn url(&self) -> String {
        self.url.clone()
    }

    async fn title(&self) -> anyhow::Result<String> {
        Ok(self.title.clone())
    }

    async fn content(&self) -> anyhow::Result<String> {
        Ok(self.content.clone())
    }
}
