//! Lifecycle dispatcher.
//!
//! A [`Session`] walks `Created → Started → (PageActive)* → Exited`. Each
//! transition runs one pass over the plugins in configured order, awaiting
//! one hook at a time. A hook that errors, panics or overruns the host
//! timeout is recorded in the pass's [`StageReport`] and the pass continues
//! with the next plugin.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::context::LifecycleContext;
use crate::page::PageHandle;
use crate::plugin::{Hook, HookResult, LifecyclePlugin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Started,
    PageActive,
    Exited,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("cannot run {hook} in state {state:?}")]
    InvalidTransition { hook: Hook, state: SessionState },

    #[error("session already exited")]
    AlreadyExited,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Error(String),
    Panicked(String),
    TimedOut(Duration),
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Error(message) => write!(f, "failed: {}", message),
            FailureKind::Panicked(message) => write!(f, "panicked: {}", message),
            FailureKind::TimedOut(limit) => write!(f, "timed out after {:?}", limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginHookFailure {
    pub ordinal: usize,
    pub plugin: String,
    pub hook: Hook,
    pub kind: FailureKind,
}

/// What happened during one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub hook: Hook,
    /// Plugins whose hook was called, by ordinal.
    pub invoked: Vec<usize>,
    /// Plugins without this hook, by ordinal.
    pub skipped: Vec<usize>,
    pub failures: Vec<PluginHookFailure>,
    /// Cancellation interrupted the pass; plugins after the last entry in
    /// `invoked` were not reached.
    pub cut_short: bool,
}

impl StageReport {
    fn new(hook: Hook) -> Self {
        Self {
            hook,
            invoked: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
            cut_short: false,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Everything [`Session::drive`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub stages: Vec<StageReport>,
    /// The session was cut short by the cancel signal.
    pub cancelled: bool,
}

impl SessionReport {
    pub fn failures(&self) -> impl Iterator<Item = &PluginHookFailure> {
        self.stages.iter().flat_map(|stage| stage.failures.iter())
    }

    pub fn pages(&self) -> usize {
        self.stages
            .iter()
            .filter(|stage| stage.hook == Hook::PageLoad)
            .count()
    }
}

/// A plugin together with its position in the configured list.
#[derive(Clone)]
pub struct RegisteredPlugin {
    pub ordinal: usize,
    pub plugin: Arc<dyn LifecyclePlugin>,
}

impl std::fmt::Debug for RegisteredPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredPlugin")
            .field("ordinal", &self.ordinal)
            .field("name", &self.plugin.name())
            .finish()
    }
}

/// Owns the plugin list and opens sessions over it.
#[derive(Debug, Clone)]
pub struct LifecycleDispatcher {
    plugins: Arc<[RegisteredPlugin]>,
    hook_timeout: Option<Duration>,
}

impl LifecycleDispatcher {
    /// Plugins in configured order; ordinals follow the vector index.
    pub fn new(plugins: Vec<Arc<dyn LifecyclePlugin>>) -> Self {
        Self::from_registered(
            plugins
                .into_iter()
                .enumerate()
                .map(|(ordinal, plugin)| RegisteredPlugin { ordinal, plugin })
                .collect(),
        )
    }

    /// Plugins with explicit ordinals, e.g. after some failed to load.
    pub fn from_registered(mut plugins: Vec<RegisteredPlugin>) -> Self {
        plugins.sort_by_key(|p| p.ordinal);
        Self {
            plugins: plugins.into(),
            hook_timeout: None,
        }
    }

    /// Bound every hook by `limit`.
    pub fn with_hook_timeout(mut self, limit: Duration) -> Self {
        self.hook_timeout = Some(limit);
        self
    }

    pub fn plugins(&self) -> &[RegisteredPlugin] {
        &self.plugins
    }

    pub fn hook_timeout(&self) -> Option<Duration> {
        self.hook_timeout
    }

    pub fn session(&self, context: Option<LifecycleContext>) -> Session {
        Session {
            plugins: Arc::clone(&self.plugins),
            hook_timeout: self.hook_timeout,
            context,
            state: SessionState::Created,
        }
    }
}

/// One automation run.
pub struct Session {
    plugins: Arc<[RegisteredPlugin]>,
    hook_timeout: Option<Duration>,
    context: Option<LifecycleContext>,
    state: SessionState,
}

impl Session {
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run `on_start` on every plugin.
    pub async fn start(&mut self) -> Result<StageReport, DispatchError> {
        self.transition(Hook::Start, SessionState::Started)?;
        let mut report = StageReport::new(Hook::Start);
        run_pass(
            &self.plugins,
            Call::Start(self.context.as_ref()),
            self.hook_timeout,
            &mut report,
        )
        .await;
        Ok(report)
    }

    /// Run `on_page_load` on every plugin for `page`.
    pub async fn page_loaded(
        &mut self,
        page: Arc<dyn PageHandle>,
    ) -> Result<StageReport, DispatchError> {
        self.transition(Hook::PageLoad, SessionState::PageActive)?;
        let mut report = StageReport::new(Hook::PageLoad);
        run_pass(&self.plugins, Call::PageLoad(&page), self.hook_timeout, &mut report).await;
        Ok(report)
    }

    /// Run `on_exit` on every plugin. Allowed once, from any other state.
    pub async fn exit(&mut self) -> Result<StageReport, DispatchError> {
        self.transition(Hook::Exit, SessionState::Exited)?;
        let mut report = StageReport::new(Hook::Exit);
        run_pass(&self.plugins, Call::Exit, self.hook_timeout, &mut report).await;
        Ok(report)
    }

    /// Start, feed pages from `pages` until the channel closes or `cancel`
    /// resolves, then exit.
    ///
    /// `cancel` is raced against every start and page pass, so a hook that
    /// never returns cannot hold the session open. A pass interrupted this
    /// way keeps the failures it already recorded and is marked
    /// [`cut_short`](StageReport::cut_short). The exit pass runs whichever
    /// way the session ends and is bounded only by the hook timeout.
    pub async fn drive<C>(
        mut self,
        mut pages: mpsc::Receiver<Arc<dyn PageHandle>>,
        cancel: C,
    ) -> Result<SessionReport, DispatchError>
    where
        C: Future<Output = ()>,
    {
        if self.state != SessionState::Created {
            return Err(DispatchError::InvalidTransition {
                hook: Hook::Start,
                state: self.state,
            });
        }

        let mut stages = Vec::new();
        tokio::pin!(cancel);

        self.transition(Hook::Start, SessionState::Started)?;
        let (report, mut cancelled) = cancellable_pass(
            &self.plugins,
            Call::Start(self.context.as_ref()),
            self.hook_timeout,
            cancel.as_mut(),
        )
        .await;
        if !report.invoked.is_empty() || !cancelled {
            stages.push(report);
        }

        while !cancelled {
            let page = tokio::select! {
                biased;
                _ = cancel.as_mut() => {
                    cancelled = true;
                    break;
                }
                page = pages.recv() => match page {
                    Some(page) => page,
                    None => break,
                },
            };

            self.transition(Hook::PageLoad, SessionState::PageActive)?;
            let (report, cut) = cancellable_pass(
                &self.plugins,
                Call::PageLoad(&page),
                self.hook_timeout,
                cancel.as_mut(),
            )
            .await;
            stages.push(report);
            cancelled = cut;
        }

        if cancelled {
            debug!("Session cancelled, running exit hooks");
        }
        stages.push(self.exit().await?);

        Ok(SessionReport { stages, cancelled })
    }

    fn transition(&mut self, hook: Hook, next: SessionState) -> Result<(), DispatchError> {
        let allowed = match (self.state, hook) {
            (SessionState::Exited, _) => return Err(DispatchError::AlreadyExited),
            (SessionState::Created, Hook::Start) => true,
            (SessionState::Started | SessionState::PageActive, Hook::PageLoad) => true,
            (_, Hook::Exit) => true,
            _ => false,
        };
        if !allowed {
            return Err(DispatchError::InvalidTransition {
                hook,
                state: self.state,
            });
        }
        self.state = next;
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if matches!(self.state, SessionState::Started | SessionState::PageActive) {
            warn!("Session dropped without running exit hooks");
        }
    }
}

enum Call<'a> {
    Start(Option<&'a LifecycleContext>),
    PageLoad(&'a Arc<dyn PageHandle>),
    Exit,
}

impl Call<'_> {
    fn hook(&self) -> Hook {
        match self {
            Call::Start(_) => Hook::Start,
            Call::PageLoad(_) => Hook::PageLoad,
            Call::Exit => Hook::Exit,
        }
    }
}

fn invoke<'a>(plugin: &'a dyn LifecyclePlugin, call: &Call<'a>) -> BoxFuture<'a, HookResult> {
    match call {
        Call::Start(context) => plugin.on_start(*context),
        Call::PageLoad(page) => plugin.on_page_load(Arc::clone(page)),
        Call::Exit => plugin.on_exit(),
    }
}

/// Run one pass unless `cancel` resolves first. Returns the report and
/// whether the pass was cut short.
async fn cancellable_pass<C>(
    plugins: &[RegisteredPlugin],
    call: Call<'_>,
    hook_timeout: Option<Duration>,
    cancel: Pin<&mut C>,
) -> (StageReport, bool)
where
    C: Future<Output = ()>,
{
    let mut report = StageReport::new(call.hook());
    let cut_short = {
        let pass = run_pass(plugins, call, hook_timeout, &mut report);
        tokio::select! {
            biased;
            _ = cancel => true,
            _ = pass => false,
        }
    };
    if cut_short {
        report.cut_short = true;
        debug!(hook = %report.hook, "Lifecycle pass cut short");
    }
    (report, cut_short)
}

/// Record into `report` as each hook finishes, so a dropped pass keeps
/// everything up to the hook that was running.
async fn run_pass(
    plugins: &[RegisteredPlugin],
    call: Call<'_>,
    hook_timeout: Option<Duration>,
    report: &mut StageReport,
) {
    let hook = call.hook();

    for registered in plugins {
        let plugin = registered.plugin.as_ref();
        if !plugin.hooks().contains(hook) {
            report.skipped.push(registered.ordinal);
            continue;
        }
        report.invoked.push(registered.ordinal);

        if let Err(kind) = guarded(invoke(plugin, &call), hook_timeout).await {
            warn!(
                plugin = plugin.name(),
                ordinal = registered.ordinal,
                "{} {}",
                hook,
                kind
            );
            report.failures.push(PluginHookFailure {
                ordinal: registered.ordinal,
                plugin: plugin.name().to_string(),
                hook,
                kind,
            });
        }
    }

    debug!(
        hook = %hook,
        invoked = report.invoked.len(),
        skipped = report.skipped.len(),
        failed = report.failures.len(),
        "Lifecycle pass finished"
    );
}

/// Await one hook, turning errors, panics and overruns into a [`FailureKind`].
async fn guarded(
    hook: BoxFuture<'_, HookResult>,
    limit: Option<Duration>,
) -> Result<(), FailureKind> {
    let caught = AssertUnwindSafe(hook).catch_unwind();
    let outcome = match limit {
        Some(limit) => match tokio::time::timeout(limit, caught).await {
            Ok(outcome) => outcome,
            Err(_) => return Err(FailureKind::TimedOut(limit)),
        },
        None => caught.await,
    };

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(FailureKind::Error(format!("{:#}", err))),
        Err(payload) => Err(FailureKind::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::PluginModule;

    fn dispatcher() -> LifecycleDispatcher {
        let plugin: Arc<dyn LifecyclePlugin> = Arc::new(PluginModule::new("noop").on_exit(|| Ok(())));
        LifecycleDispatcher::new(vec![plugin])
    }

    #[tokio::test]
    async fn states_advance_in_order() {
        let mut session = dispatcher().session(None);
        assert_eq!(session.state(), SessionState::Created);

        session.start().await.unwrap();
        assert_eq!(session.state(), SessionState::Started);

        session.exit().await.unwrap();
        assert_eq!(session.state(), SessionState::Exited);
    }

    #[tokio::test]
    async fn out_of_order_calls_are_rejected() {
        let mut session = dispatcher().session(None);
        let page: Arc<dyn PageHandle> = Arc::new(crate::page::PageSnapshot::default());

        assert_eq!(
            session.page_loaded(Arc::clone(&page)).await.unwrap_err(),
            DispatchError::InvalidTransition {
                hook: Hook::PageLoad,
                state: SessionState::Created
            }
        );

        session.start().await.unwrap();
        assert!(matches!(
            session.start().await,
            Err(DispatchError::InvalidTransition { .. })
        ));

        session.exit().await.unwrap();
        assert_eq!(session.exit().await.unwrap_err(), DispatchError::AlreadyExited);
        assert_eq!(
            session.page_loaded(page).await.unwrap_err(),
            DispatchError::AlreadyExited
        );
    }

    #[tokio::test]
    async fn absent_hooks_are_skipped() {
        let mut session = dispatcher().session(None);
        let report = session.start().await.unwrap();
        assert!(report.invoked.is_empty());
        assert_eq!(report.skipped, vec![0]);

        let report = session.exit().await.unwrap();
        assert_eq!(report.invoked, vec![0]);
    }

    #[test]
    fn panic_messages_are_extracted() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
