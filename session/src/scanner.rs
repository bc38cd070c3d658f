//! ScannerSession
//!
//! Owns every long-lived task of one scanner run: the market manager and a
//! supervisor per configured feed. `start` spawns them, `stop` signals
//! shutdown and joins them. Nothing is process-global.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use adapters::{FeedState, FeedSupervisor, HeliusFeed, PumpPortalFeed, WatchedMints};
use common::logger::{TraceId, child_span, root_span};
use common::shutdown::ShutdownSignal;
use common::time::now_ms;
use market::{Command, MarketHandle, MarketManager, TickReport};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, warn};

use crate::config::SessionConfig;
use crate::sink::MarketSink;

/// How long `stop` waits for each task.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ScannerSession {
    trace_id: TraceId,
    handle: MarketHandle,
    shutdown: ShutdownSignal,
    reports: Option<mpsc::Receiver<Arc<TickReport>>>,
    feed_states: HashMap<&'static str, watch::Receiver<FeedState>>,
    tasks: Vec<(&'static str, JoinHandle<anyhow::Result<()>>)>,
}

impl ScannerSession {
    /// Spawns the manager and feed supervisors. Must be called inside a
    /// tokio runtime.
    pub fn start(cfg: SessionConfig) -> Self {
        let trace_id = TraceId::default();
        let root = root_span("scanner_session", &trace_id);
        let _entered = root.enter();

        let shutdown = ShutdownSignal::new();
        let (manager, handle) = MarketManager::new(cfg.scanner.clone());
        let mut manager = manager.with_sort(cfg.sort);
        let reports = manager.subscribe(cfg.report_capacity);

        let now = now_ms();
        for mint in &cfg.track {
            manager.apply(Command::Track(mint.clone()), now);
        }

        let mut tasks = Vec::new();
        let mut feed_states = HashMap::new();

        let sd = shutdown.clone();
        let market_task = tokio::spawn(
            async move {
                manager.run(sd).await;
                Ok(())
            }
            .instrument(child_span("market_manager")),
        );
        tasks.push(("market_manager", market_task));

        let pump = PumpPortalFeed::new(cfg.pumpportal_url.clone());
        let (name, state, task) = spawn_feed(pump, &handle, &cfg, &shutdown);
        feed_states.insert(name, state);
        tasks.push((name, task));

        match &cfg.helius_url {
            Some(url) => {
                let helius = HeliusFeed::new(url.clone(), cfg.balance_cache_capacity);
                let (name, state, task) = spawn_feed(helius, &handle, &cfg, &shutdown);
                feed_states.insert(name, state);
                tasks.push((name, task));
            }
            None => warn!("no balance feed configured; trade metrics will stay empty"),
        }

        info!(
            trace_id = %trace_id.as_str(),
            feeds = feed_states.len(),
            tracked = cfg.track.len(),
            "scanner session started"
        );

        Self {
            trace_id,
            handle,
            shutdown,
            reports: Some(reports),
            feed_states,
            tasks,
        }
    }

    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    pub fn handle(&self) -> &MarketHandle {
        &self.handle
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Push stream of tick reports. Only the first caller gets it.
    pub fn take_reports(&mut self) -> Option<mpsc::Receiver<Arc<TickReport>>> {
        self.reports.take()
    }

    pub fn feed_state(&self, feed: &str) -> Option<FeedState> {
        self.feed_states.get(feed).map(|rx| *rx.borrow())
    }

    pub fn feed_states(&self) -> impl Iterator<Item = (&'static str, FeedState)> + '_ {
        self.feed_states.iter().map(|(name, rx)| (*name, *rx.borrow()))
    }

    /// Signals shutdown and joins every task. No tick or reconnect runs
    /// after this returns.
    pub async fn stop(self) -> anyhow::Result<()> {
        info!(trace_id = %self.trace_id.as_str(), "stopping scanner session");
        self.shutdown.trigger();

        let mut first_err = None;
        for (name, task) in self.tasks {
            let outcome = match tokio::time::timeout(STOP_TIMEOUT, task).await {
                Ok(Ok(Ok(()))) => Ok(()),
                Ok(Ok(Err(e))) => Err(e.context(format!("{name} failed"))),
                Ok(Err(join)) => Err(anyhow::anyhow!("{name} panicked: {join}")),
                Err(_) => Err(anyhow::anyhow!("{name} did not stop within {STOP_TIMEOUT:?}")),
            };
            if let Err(e) = outcome {
                error!(task = name, error = %e, "task ended badly");
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => {
                info!("scanner session stopped");
                Ok(())
            }
        }
    }
}

fn spawn_feed<F>(
    feed: F,
    handle: &MarketHandle,
    cfg: &SessionConfig,
    shutdown: &ShutdownSignal,
) -> (
    &'static str,
    watch::Receiver<FeedState>,
    JoinHandle<anyhow::Result<()>>,
)
where
    F: adapters::Feed + 'static,
{
    let name = feed.name();
    let watched: watch::Receiver<WatchedMints> = handle.watched();
    let supervisor = FeedSupervisor::new(
        feed,
        MarketSink(handle.clone()),
        watched,
        cfg.supervisor,
        shutdown.clone(),
    );
    let state = supervisor.state();
    let span = tracing::info_span!("feed_supervisor", feed = name);
    let task = tokio::spawn(supervisor.run().instrument(span));
    (name, state, task)
}
