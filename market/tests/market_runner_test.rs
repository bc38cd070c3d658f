//! Drives a live `MarketManager::run` loop through its handle.

mod support;

use std::time::Duration;

use common::shutdown::ShutdownSignal;
use corelib::Direction;
use market::{MarketError, MarketManager, ScannerConfig};
use tokio::time::Instant;

use support::{NOW, created, trade};

fn fixed_clock() -> u64 {
    NOW
}

#[tokio::test(start_paused = true)]
async fn commands_are_applied_before_the_first_tick() {
    let (mut manager, handle) = MarketManager::new(ScannerConfig::default());
    let mut reports = manager.subscribe(8);
    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn(manager.with_clock(fixed_clock).run(shutdown.clone()));

    handle.feed(created("a", 5.0)).await.unwrap();
    handle
        .feed(trade("a", NOW - 1_000, 2.0, Direction::Buy))
        .await
        .unwrap();
    handle.track("pinned-mint").await.unwrap();

    let report = reports.recv().await.unwrap();
    assert_eq!(report.ts_ms, NOW);
    assert_eq!(report.stats.tracked, 2);
    assert_eq!(report.counters.trades_appended, 1);
    assert_eq!(handle.watched().borrow().len(), 2);

    shutdown.trigger();
    task.await.unwrap();

    assert!(handle.latest().await.is_some());
    assert!(matches!(
        handle.track("late").await,
        Err(MarketError::ManagerStopped)
    ));
}

#[tokio::test(start_paused = true)]
async fn refresh_interval_change_reschedules_ticks() {
    let (mut manager, handle) = MarketManager::new(ScannerConfig::default());
    let mut reports = manager.subscribe(8);
    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn(manager.with_clock(fixed_clock).run(shutdown.clone()));

    // first tick one default period after start
    reports.recv().await.unwrap();

    let version = handle
        .patch_settings(vec![("refreshIntervalMs".into(), "1000".into())])
        .await
        .unwrap();
    assert_eq!(version, 1);

    // the rebuilt interval fires every second from the change
    let first = reports.recv().await.unwrap();
    assert_eq!(first.config.refresh_interval_ms, 1_000);
    let started = Instant::now();
    reports.recv().await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(1_000));
    assert!(elapsed < Duration::from_millis(3_000));

    shutdown.trigger();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_stops_the_loop() {
    let (manager, handle) = MarketManager::new(ScannerConfig::default());
    let task = tokio::spawn(manager.run(ShutdownSignal::new()));

    drop(handle);

    tokio::time::timeout(Duration::from_secs(60), task)
        .await
        .expect("manager should exit once its command channel closes")
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ticks_keep_their_period_under_a_command_flood() {
    let cfg = ScannerConfig {
        refresh_interval_ms: 20,
        ..ScannerConfig::default()
    };
    let (manager, handle) = MarketManager::new(cfg);
    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn(manager.run(shutdown.clone()));

    handle.feed(created("busy", 5.0)).await.unwrap();

    let deadline = Instant::now() + Duration::from_millis(600);
    let producers: Vec<_> = (0..3)
        .map(|_| {
            let handle = handle.clone();
            tokio::spawn(async move {
                while Instant::now() < deadline {
                    let ev = trade("busy", common::time::now_ms(), 1.0, Direction::Buy);
                    if handle.feed(ev).await.is_err() {
                        break;
                    }
                }
            })
        })
        .collect();
    for p in producers {
        p.await.unwrap();
    }

    let counters = handle.counters();
    assert!(counters.trades_appended > 100, "flood too thin: {counters:?}");
    // ~30 periods elapsed; allow scheduling slack but not starvation
    assert!(counters.ticks >= 10, "ticks starved: {counters:?}");

    shutdown.trigger();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn handle_toggles_explicit_track_flag() {
    let (mut manager, handle) = MarketManager::new(ScannerConfig::default());
    let mut reports = manager.subscribe(8);
    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn(manager.with_clock(fixed_clock).run(shutdown.clone()));

    handle.feed(created("a", 5.0)).await.unwrap();
    handle.toggle_track("a").await.unwrap();

    let report = reports.recv().await.unwrap();
    assert!(report.rows[0].is_tracked);
    assert!(!report.rows[0].is_pinned);

    handle.toggle_track("a").await.unwrap();
    let report = reports.recv().await.unwrap();
    assert!(!report.rows[0].is_tracked);

    shutdown.trigger();
    task.await.unwrap();
}
