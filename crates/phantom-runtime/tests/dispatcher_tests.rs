//! Session lifecycle behaviour across plugins.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use phantom_runtime::{
    FailureKind, Hook, HookResult, LifecycleContext, LifecycleDispatcher, LifecyclePlugin,
    PageHandle, PageSnapshot, PluginModule, SessionState, command_of, url_of,
};
use tokio::sync::{mpsc, oneshot};

type Log = Arc<Mutex<Vec<String>>>;

/// A plugin that records every hook it sees.
fn recording(name: &'static str, log: &Log) -> PluginModule {
    let start_log = Arc::clone(log);
    let page_log = Arc::clone(log);
    let exit_log = Arc::clone(log);
    PluginModule::new(name)
        .on_start(move |ctx| {
            start_log.lock().push(format!(
                "{name}:start:{}:{}",
                command_of(ctx),
                url_of(ctx)
            ));
            Ok(())
        })
        .on_page_load(move |page| {
            let log = Arc::clone(&page_log);
            async move {
                let title = page.title().await?;
                log.lock().push(format!("{name}:page:{title}"));
                HookResult::Ok(())
            }
            .boxed()
        })
        .on_exit(move || {
            exit_log.lock().push(format!("{name}:exit"));
            Ok(())
        })
}

fn page(title: &str) -> Arc<dyn PageHandle> {
    Arc::new(PageSnapshot::new(format!("https://example.com/{title}"), title))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().clone()
}

fn explode() -> HookResult {
    panic!("page exploded")
}

#[tokio::test]
async fn hooks_run_in_configured_order_per_stage() {
    let log = Log::default();
    let plugins: Vec<Arc<dyn LifecyclePlugin>> = vec![
        Arc::new(recording("first", &log)),
        Arc::new(recording("second", &log)),
    ];
    let dispatcher = LifecycleDispatcher::new(plugins);
    let ctx = LifecycleContext::new("puppeteer")
        .with_command("open")
        .with_url("https://example.com");

    let mut session = dispatcher.session(Some(ctx));
    session.start().await.unwrap();
    session.page_loaded(page("one")).await.unwrap();
    session.page_loaded(page("two")).await.unwrap();
    assert_eq!(session.state(), SessionState::PageActive);
    session.exit().await.unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "first:start:open:https://example.com",
            "second:start:open:https://example.com",
            "first:page:one",
            "second:page:one",
            "first:page:two",
            "second:page:two",
            "first:exit",
            "second:exit",
        ]
    );
}

#[tokio::test]
async fn absent_context_renders_placeholders() {
    let log = Log::default();
    let plugins: Vec<Arc<dyn LifecyclePlugin>> = vec![
        Arc::new(recording("only", &log)),
        Arc::new(phantom_runtime::builtin::LoggerPlugin),
    ];
    let mut session = LifecycleDispatcher::new(plugins).session(None);

    let report = session.start().await.unwrap();
    assert!(report.is_clean());
    assert_eq!(entries(&log), vec!["only:start:unknown:N/A"]);
    session.exit().await.unwrap();
}

#[tokio::test]
async fn failing_start_does_not_stop_later_plugins() {
    let log = Log::default();
    let exit_log = Arc::clone(&log);
    let failing = PluginModule::new("failing")
        .on_start(|_| Err(anyhow::anyhow!("cannot attach")))
        .on_exit(move || {
            exit_log.lock().push("failing:exit".to_string());
            Ok(())
        });
    let plugins: Vec<Arc<dyn LifecyclePlugin>> =
        vec![Arc::new(failing), Arc::new(recording("healthy", &log))];
    let mut session = LifecycleDispatcher::new(plugins).session(Some(LifecycleContext::new("puppeteer")));

    let report = session.start().await.unwrap();
    assert_eq!(report.invoked, vec![0, 1]);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.ordinal, 0);
    assert_eq!(failure.plugin, "failing");
    assert_eq!(failure.hook, Hook::Start);
    assert_eq!(failure.kind, FailureKind::Error("cannot attach".to_string()));

    let report = session.exit().await.unwrap();
    assert!(report.is_clean());
    assert_eq!(
        entries(&log),
        vec!["healthy:start:unknown:N/A", "failing:exit", "healthy:exit"]
    );
}

#[tokio::test]
async fn panicking_hook_is_contained() {
    let log = Log::default();
    let panicking = PluginModule::new("panicking").on_page_load(|_| async move { explode() }.boxed());
    let plugins: Vec<Arc<dyn LifecyclePlugin>> =
        vec![Arc::new(panicking), Arc::new(recording("after", &log))];
    let mut session = LifecycleDispatcher::new(plugins).session(None);

    session.start().await.unwrap();
    let report = session.page_loaded(page("home")).await.unwrap();

    assert_eq!(
        report.failures[0].kind,
        FailureKind::Panicked("page exploded".to_string())
    );
    assert!(entries(&log).contains(&"after:page:home".to_string()));
    session.exit().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn slow_hooks_are_abandoned_after_the_timeout() {
    let log = Log::default();
    let stuck = PluginModule::new("stuck").on_page_load(|_| {
        async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            HookResult::Ok(())
        }
        .boxed()
    });
    let plugins: Vec<Arc<dyn LifecyclePlugin>> =
        vec![Arc::new(stuck), Arc::new(recording("next", &log))];
    let dispatcher = LifecycleDispatcher::new(plugins).with_hook_timeout(Duration::from_secs(5));
    let mut session = dispatcher.session(None);

    session.start().await.unwrap();
    let report = session.page_loaded(page("slow")).await.unwrap();
    assert_eq!(
        report.failures[0].kind,
        FailureKind::TimedOut(Duration::from_secs(5))
    );
    assert!(entries(&log).contains(&"next:page:slow".to_string()));
    session.exit().await.unwrap();
}

#[tokio::test]
async fn drive_runs_pages_until_the_channel_closes() {
    let log = Log::default();
    let plugins: Vec<Arc<dyn LifecyclePlugin>> = vec![Arc::new(recording("p", &log))];
    let session = LifecycleDispatcher::new(plugins).session(None);

    let (tx, rx) = mpsc::channel(4);
    tx.send(page("a")).await.unwrap();
    tx.send(page("b")).await.unwrap();
    drop(tx);

    let report = session.drive(rx, std::future::pending()).await.unwrap();
    assert!(!report.cancelled);
    assert_eq!(report.pages(), 2);
    assert_eq!(report.stages.last().unwrap().hook, Hook::Exit);
    assert_eq!(
        entries(&log),
        vec!["p:start:unknown:N/A", "p:page:a", "p:page:b", "p:exit"]
    );
}

#[tokio::test]
async fn cancellation_still_runs_exit() {
    let log = Log::default();
    let plugins: Vec<Arc<dyn LifecyclePlugin>> = vec![Arc::new(recording("p", &log))];
    let session = LifecycleDispatcher::new(plugins).session(None);

    let (_tx, rx) = mpsc::channel::<Arc<dyn PageHandle>>(1);
    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    cancel_tx.send(()).unwrap();

    let report = session
        .drive(rx, async move {
            let _ = cancel_rx.await;
        })
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(entries(&log).last().unwrap(), "p:exit");
    assert_eq!(report.stages.last().unwrap().hook, Hook::Exit);
}

#[tokio::test(start_paused = true)]
async fn exit_is_bounded_after_cancellation() {
    let quick_exit = PluginModule::new("quick-exit").on_exit(|| Ok(()));
    let hanging: Arc<dyn LifecyclePlugin> = Arc::new(HangingExit);
    let plugins: Vec<Arc<dyn LifecyclePlugin>> = vec![hanging, Arc::new(quick_exit)];
    let session = LifecycleDispatcher::new(plugins)
        .with_hook_timeout(Duration::from_millis(250))
        .session(None);

    let (_tx, rx) = mpsc::channel::<Arc<dyn PageHandle>>(1);
    let report = session
        .drive(rx, tokio::time::sleep(Duration::from_millis(10)))
        .await
        .unwrap();

    assert!(report.cancelled);
    let exit = report.stages.last().unwrap();
    assert_eq!(exit.invoked, vec![0, 1]);
    assert_eq!(
        exit.failures[0].kind,
        FailureKind::TimedOut(Duration::from_millis(250))
    );
}

struct HangingExit;

#[async_trait::async_trait]
impl LifecyclePlugin for HangingExit {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn on_exit(&self) -> HookResult {
        std::future::pending::<()>().await;
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_a_hanging_page_hook() {
    let log = Log::default();
    let hanging = PluginModule::new("hanging-page")
        .on_page_load(|_| std::future::pending::<HookResult>().boxed());
    let plugins: Vec<Arc<dyn LifecyclePlugin>> =
        vec![Arc::new(hanging), Arc::new(recording("after", &log))];
    let session = LifecycleDispatcher::new(plugins).session(None);

    let (tx, rx) = mpsc::channel(1);
    tx.send(page("stuck")).await.unwrap();

    let report = tokio::time::timeout(
        Duration::from_secs(3600),
        session.drive(rx, tokio::time::sleep(Duration::from_millis(10))),
    )
    .await
    .expect("drive returns once cancelled")
    .unwrap();

    assert!(report.cancelled);
    let page_stage = &report.stages[1];
    assert_eq!(page_stage.hook, Hook::PageLoad);
    assert!(page_stage.cut_short);
    assert_eq!(page_stage.invoked, vec![0]);
    assert_eq!(report.stages.last().unwrap().hook, Hook::Exit);
    assert_eq!(entries(&log).last().unwrap(), "after:exit");
    assert!(!entries(&log).contains(&"after:page:stuck".to_string()));
    drop(tx);
}

#[tokio::test(start_paused = true)]
async fn failures_before_cancellation_are_kept() {
    let failing = PluginModule::new("failing").on_start(|_| Err(anyhow::anyhow!("boom")));
    let hanging: Arc<dyn LifecyclePlugin> = Arc::new(HangingStart);
    let plugins: Vec<Arc<dyn LifecyclePlugin>> = vec![Arc::new(failing), hanging];
    let session = LifecycleDispatcher::new(plugins).session(None);

    let (_tx, rx) = mpsc::channel::<Arc<dyn PageHandle>>(1);
    let report = session
        .drive(rx, tokio::time::sleep(Duration::from_millis(10)))
        .await
        .unwrap();

    assert!(report.cancelled);
    let start = &report.stages[0];
    assert_eq!(start.hook, Hook::Start);
    assert!(start.cut_short);
    assert_eq!(start.invoked, vec![0, 1]);
    assert_eq!(report.failures().count(), 1);
    let failure = report.failures().next().unwrap();
    assert_eq!(failure.ordinal, 0);
    assert_eq!(failure.kind, FailureKind::Error("boom".to_string()));
    assert_eq!(report.stages.last().unwrap().hook, Hook::Exit);
}

#[tokio::test]
async fn narrowed_hook_sets_skip_the_rest() {
    let plugins: Vec<Arc<dyn LifecyclePlugin>> = vec![Arc::new(StartOnly)];
    let mut session = LifecycleDispatcher::new(plugins).session(None);

    assert_eq!(session.start().await.unwrap().invoked, vec![0]);
    let report = session.page_loaded(page("x")).await.unwrap();
    assert!(report.invoked.is_empty());
    assert_eq!(report.skipped, vec![0]);
    assert_eq!(session.exit().await.unwrap().skipped, vec![0]);
}

struct HangingStart;

#[async_trait::async_trait]
impl LifecyclePlugin for HangingStart {
    fn name(&self) -> &str {
        "hanging-start"
    }

    async fn on_start(&self, _context: Option<&LifecycleContext>) -> HookResult {
        std::future::pending::<()>().await;
        Ok(())
    }
}

struct StartOnly;

#[async_trait::async_trait]
impl LifecyclePlugin for StartOnly {
    fn name(&self) -> &str {
        "start-only"
    }

    fn hooks(&self) -> phantom_runtime::HookSet {
        phantom_runtime::HookSet::NONE.with(Hook::Start)
    }
}
