//! The plugin contract: three optional lifecycle hooks.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::context::LifecycleContext;
use crate::page::PageHandle;

/// Outcome of one hook invocation.
pub type HookResult = anyhow::Result<()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Start,
    PageLoad,
    Exit,
}

impl Hook {
    /// Name of the hook as plugin authors export it.
    pub fn export_name(&self) -> &'static str {
        match self {
            Hook::Start => "onStart",
            Hook::PageLoad => "onPageLoad",
            Hook::Exit => "onExit",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.export_name())
    }
}

/// Which hooks a plugin provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HookSet {
    pub on_start: bool,
    pub on_page_load: bool,
    pub on_exit: bool,
}

impl HookSet {
    pub const ALL: HookSet = HookSet {
        on_start: true,
        on_page_load: true,
        on_exit: true,
    };

    pub const NONE: HookSet = HookSet {
        on_start: false,
        on_page_load: false,
        on_exit: false,
    };

    pub fn with(mut self, hook: Hook) -> Self {
        match hook {
            Hook::Start => self.on_start = true,
            Hook::PageLoad => self.on_page_load = true,
            Hook::Exit => self.on_exit = true,
        }
        self
    }

    pub fn contains(&self, hook: Hook) -> bool {
        match hook {
            Hook::Start => self.on_start,
            Hook::PageLoad => self.on_page_load,
            Hook::Exit => self.on_exit,
        }
    }
}

/// A lifecycle plugin. Every hook is optional.
///
/// Hooks the plugin does not list in [`hooks`](LifecyclePlugin::hooks) are
/// skipped by the dispatcher rather than called. Errors and panics stay with
/// the plugin that raised them; the dispatcher records them and moves on.
#[async_trait]
pub trait LifecyclePlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Hooks the dispatcher calls. Defaults to all three, whose default
    /// bodies do nothing; a plugin implementing only some hooks should
    /// narrow this so the others show up as skipped in a [`StageReport`].
    ///
    /// [`StageReport`]: crate::StageReport
    fn hooks(&self) -> HookSet {
        HookSet::ALL
    }

    /// Called once per session. `context` may be absent.
    async fn on_start(&self, _context: Option<&LifecycleContext>) -> HookResult {
        Ok(())
    }

    /// Called once per loaded page.
    async fn on_page_load(&self, _page: Arc<dyn PageHandle>) -> HookResult {
        Ok(())
    }

    /// Called exactly once when the session ends.
    async fn on_exit(&self) -> HookResult {
        Ok(())
    }
}

type StartHook = Box<dyn Fn(Option<&LifecycleContext>) -> HookResult + Send + Sync>;
type PageLoadHook = Box<dyn Fn(Arc<dyn PageHandle>) -> BoxFuture<'static, HookResult> + Send + Sync>;
type ExitHook = Box<dyn Fn() -> HookResult + Send + Sync>;

/// A plugin assembled from closures, providing any subset of the hooks.
///
/// ```
/// use futures::FutureExt;
/// use phantom_runtime::PluginModule;
///
/// let seo = PluginModule::new("seo")
///     .on_start(|ctx| {
///         println!("engine: {:?}", ctx.map(|c| c.engine.clone()));
///         Ok(())
///     })
///     .on_page_load(|page| {
///         async move {
///             println!("title: {}", page.title().await?);
///             phantom_runtime::HookResult::Ok(())
///         }
///         .boxed()
///     });
/// assert!(!seo.provided().on_exit);
/// ```
pub struct PluginModule {
    name: String,
    on_start: Option<StartHook>,
    on_page_load: Option<PageLoadHook>,
    on_exit: Option<ExitHook>,
}

impl PluginModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on_start: None,
            on_page_load: None,
            on_exit: None,
        }
    }

    pub fn on_start<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<&LifecycleContext>) -> HookResult + Send + Sync + 'static,
    {
        self.on_start = Some(Box::new(hook));
        self
    }

    pub fn on_page_load<F>(mut self, hook: F) -> Self
    where
        F: Fn(Arc<dyn PageHandle>) -> BoxFuture<'static, HookResult> + Send + Sync + 'static,
    {
        self.on_page_load = Some(Box::new(hook));
        self
    }

    pub fn on_exit<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> HookResult + Send + Sync + 'static,
    {
        self.on_exit = Some(Box::new(hook));
        self
    }

    pub fn provided(&self) -> HookSet {
        let mut set = HookSet::NONE;
        if self.on_start.is_some() {
            set = set.with(Hook::Start);
        }
        if self.on_page_load.is_some() {
            set = set.with(Hook::PageLoad);
        }
        if self.on_exit.is_some() {
            set = set.with(Hook::Exit);
        }
        set
    }
}

impl fmt::Debug for PluginModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginModule")
            .field("name", &self.name)
            .field("hooks", &self.provided())
            .finish()
    }
}

#[async_trait]
impl LifecyclePlugin for PluginModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn hooks(&self) -> HookSet {
        self.provided()
    }

    async fn on_start(&self, context: Option<&LifecycleContext>) -> HookResult {
        match &self.on_start {
            Some(hook) => hook(context),
            None => Ok(()),
        }
    }

    async fn on_page_load(&self, page: Arc<dyn PageHandle>) -> HookResult {
        match &self.on_page_load {
            Some(hook) => hook(page).await,
            None => Ok(()),
        }
    }

    async fn on_exit(&self) -> HookResult {
        match &self.on_exit {
            Some(hook) => hook(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provided_hooks_follow_the_closures() {
        let module = PluginModule::new("partial").on_exit(|| Ok(()));
        assert_eq!(
            module.provided(),
            HookSet {
                on_start: false,
                on_page_load: false,
                on_exit: true
            }
        );
        assert!(HookSet::ALL.contains(Hook::PageLoad));
        assert!(!HookSet::NONE.contains(Hook::Start));
    }

    #[test]
    fn hooks_display_their_export_names() {
        assert_eq!(Hook::Start.to_string(), "onStart");
        assert_eq!(Hook::PageLoad.to_string(), "onPageLoad");
        assert_eq!(Hook::Exit.to_string(), "onExit");
    }
}
