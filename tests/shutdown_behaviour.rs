// tests/shutdown_behaviour.rs
mod common;
use crate::common::{init_tracing, with_timeout, FakeBackend, Harness, RecordingSignaller, PID};

use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

use fs_reloader::fs::mock::MockFileSystem;
use fs_reloader::lifecycle::{state_channel, LifecycleState};
use fs_reloader::reload::{DebounceOptions, ReloadDebouncer};
use fs_reloader::types::{ReloadRequest, Signal};
use fs_reloader::watch::{
    index_directories, register_watch_set, EventWatcher, ExclusionRules, ReloadFilter,
    WatchBackend, WatchSet,
};

type TestResult = Result<(), Box<dyn Error>>;

const TICK: Duration = Duration::from_secs(5);

const ROOT: &str = "/srv/app";

fn project_fs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("/srv/app/a.php");
    fs.add_file("/srv/app/config/services.yaml");
    fs
}

fn project() -> Result<WatchSet, Box<dyn Error>> {
    Ok(index_directories(
        &project_fs(),
        Path::new(ROOT),
        &ExclusionRules::default(),
    )?)
}

#[tokio::test(start_paused = true)]
async fn lifecycle_moves_through_every_state() -> TestResult {
    init_tracing();
    let mut h = Harness::start(&project_fs(), ROOT, Some(PID), TICK);
    assert_eq!(*h.state.borrow(), LifecycleState::Running);

    let report = h.terminate().await;

    assert_eq!(*h.state.borrow(), LifecycleState::Stopped);
    assert!(h.backend.is_closed());
    assert_eq!(h.backend.close_calls(), 1);
    assert!(!report.backend_close_failed);
    assert!(report.debounce.is_some());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn queued_requests_are_dropped_after_termination() -> TestResult {
    init_tracing();
    let mut h = Harness::start(&project_fs(), ROOT, Some(PID), TICK);
    let t0 = Instant::now();

    sleep_until(t0 + Duration::from_millis(1000)).await;
    h.backend.write("/srv/app/a.php");
    h.backend.write("/srv/app/config/services.yaml");
    sleep_until(t0 + Duration::from_millis(2000)).await;

    let report = h.terminate().await;
    let stats = report.debounce.expect("debouncer was running");
    assert_eq!(stats.requests, 2);
    assert_eq!(stats.reloads_sent, 0);
    assert_eq!(stats.discarded, 2);

    // Well past the tick that would have fired.
    sleep_until(t0 + Duration::from_secs(30)).await;
    assert!(h.signaller.reloads().is_empty());

    // The backend is gone: nothing is delivered any more.
    assert!(!h.backend.write("/srv/app/a.php"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn backend_close_failure_does_not_block_shutdown() -> TestResult {
    init_tracing();
    let (backend, streams, handle) = FakeBackend::new();
    let backend = backend.failing_close();
    let mut h = Harness::start_with(
        (backend, streams, handle),
        &project_fs(),
        ROOT,
        Some(PID),
        TICK,
    );

    let report = h.terminate().await;

    assert!(report.backend_close_failed);
    assert!(report.debounce.is_some());
    assert_eq!(*h.state.borrow(), LifecycleState::Stopped);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn log_only_mode_never_signals_and_still_stops() -> TestResult {
    init_tracing();
    let mut h = Harness::start(&project_fs(), ROOT, None, TICK);
    let t0 = Instant::now();

    sleep_until(t0 + Duration::from_millis(500)).await;
    assert!(h.backend.write("/srv/app/a.php"));
    sleep_until(t0 + Duration::from_secs(12)).await;

    let report = h.terminate().await;
    assert!(report.debounce.is_none());
    assert!(h.signaller.reloads().is_empty());
    assert_eq!(h.signaller.probes(), 0);
    assert_eq!(*h.state.borrow(), LifecycleState::Stopped);
    Ok(())
}

#[tokio::test]
async fn full_reload_channel_blocks_the_watcher_without_losing_requests() -> TestResult {
    init_tracing();
    let (mut backend, streams, handle) = FakeBackend::new();
    register_watch_set(&mut backend, &project()?)?;

    let (reload_tx, mut reload_rx) = mpsc::channel::<ReloadRequest>(1);
    let watcher = EventWatcher::new(streams, ReloadFilter::default(), Some(reload_tx)).spawn();

    for _ in 0..3 {
        assert!(handle.write("/srv/app/a.php"));
    }
    tokio::task::yield_now().await;

    // One request buffered, the watcher parked on the second send.
    let mut received = 0;
    while received < 3 {
        with_timeout(reload_rx.recv())
            .await
            .expect("watcher still holds the sender");
        received += 1;
    }
    assert!(reload_rx.try_recv().is_err());

    backend.close()?;
    with_timeout(watcher).await?;
    assert!(
        reload_rx.recv().await.is_none(),
        "watcher exit closes the reload channel"
    );
    Ok(())
}

#[tokio::test]
async fn watcher_parked_on_send_exits_when_channel_closes() -> TestResult {
    init_tracing();
    let (mut backend, streams, handle) = FakeBackend::new();
    register_watch_set(&mut backend, &project()?)?;

    let (reload_tx, reload_rx) = mpsc::channel::<ReloadRequest>(1);
    let watcher = EventWatcher::new(streams, ReloadFilter::default(), Some(reload_tx)).spawn();

    handle.write("/srv/app/a.php");
    handle.write("/srv/app/a.php");
    tokio::task::yield_now().await;

    drop(reload_rx);
    with_timeout(watcher).await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn debouncer_only_signals_while_running() -> TestResult {
    init_tracing();
    let signaller = RecordingSignaller::with_live([PID]);
    let (state_tx, state_rx) = state_channel();
    let (reload_tx, reload_rx) = mpsc::channel::<ReloadRequest>(1);
    let (stop_tx, stop_rx) = oneshot::channel();

    let debouncer = ReloadDebouncer::new(
        DebounceOptions {
            pid: PID,
            signal: Signal::Hup,
            tick: TICK,
        },
        reload_rx,
        stop_rx,
        state_rx,
        Arc::new(signaller.clone()),
    )
    .spawn();
    let t0 = Instant::now();

    // Still Starting: the request is counted, the tick is swallowed.
    reload_tx.send(ReloadRequest).await?;
    sleep_until(t0 + Duration::from_millis(5500)).await;
    assert!(signaller.reloads().is_empty());

    state_tx.send_replace(LifecycleState::Running);
    reload_tx.send(ReloadRequest).await?;
    sleep_until(t0 + Duration::from_millis(10_500)).await;
    assert_eq!(signaller.reloads().len(), 1);
    assert_eq!(signaller.reloads()[0].signal, Signal::Hup);

    state_tx.send_replace(LifecycleState::ShuttingDown);
    reload_tx.send(ReloadRequest).await?;
    // Closing the reload channel alone does not stop the debouncer.
    drop(reload_tx);
    sleep_until(t0 + Duration::from_millis(15_500)).await;
    assert!(!debouncer.is_finished());
    assert_eq!(signaller.reloads().len(), 1);

    stop_tx.send(()).map_err(|_| "debouncer gone")?;
    let stats = with_timeout(debouncer).await?;
    assert_eq!(stats.requests, 3);
    assert_eq!(stats.reloads_sent, 1);
    assert_eq!(stats.discarded, 2);
    Ok(())
}
