//! MarketManager
//!
//! Single writer over the tracked set. Feed events, user commands and ticks
//! are applied one at a time from one task, so no reader ever sees a
//! half-updated record. Everything else talks to it through [`MarketHandle`].

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use common::logger::warn_if_slow;
use common::shutdown::ShutdownSignal;
use common::time::now_ms;
use corelib::FeedEvent;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::alerts::AlertBook;
use crate::asset::AssetSeed;
use crate::config::{ScannerConfig, SettingsInput};
use crate::error::MarketError;
use crate::metrics::{CounterSnapshot, Counters, bump};
use crate::ranking::{SortSpec, rank};
use crate::tracked::{Admission, TrackedSet, TradeOutcome};
use crate::types::{Command, TickReport, WatchedMints};
use crate::view::ScannerView;

pub const COMMAND_CHANNEL_CAPACITY: usize = 1024;

pub struct MarketManager {
    config: ScannerConfig,
    settings: SettingsInput,
    sort: SortSpec,
    set: TrackedSet,
    alerts: AlertBook,
    counters: Counters,
    view: ScannerView,
    subscribers: Vec<mpsc::Sender<Arc<TickReport>>>,
    watched_tx: watch::Sender<WatchedMints>,
    commands: Option<mpsc::Receiver<Command>>,
    clock: fn() -> u64,
}

impl MarketManager {
    pub fn new(config: ScannerConfig) -> (Self, MarketHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (watched_tx, watched_rx) = watch::channel(Arc::new(BTreeSet::new()));
        let counters = Counters::default();
        let view = ScannerView::new();

        let manager = Self {
            settings: SettingsInput::from_config(&config),
            config,
            sort: SortSpec::default(),
            set: TrackedSet::new(),
            alerts: AlertBook::new(),
            counters: counters.clone(),
            view: view.clone(),
            subscribers: Vec::new(),
            watched_tx,
            commands: Some(cmd_rx),
            clock: now_ms,
        };
        let handle = MarketHandle {
            tx: cmd_tx,
            view,
            watched: watched_rx,
            counters,
        };
        (manager, handle)
    }

    /// Replaces the wall clock used by [`MarketManager::run`].
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// Registers a push consumer of tick reports. A full subscriber misses
    /// reports instead of stalling the tick.
    pub fn subscribe(&mut self, capacity: usize) -> mpsc::Receiver<Arc<TickReport>> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.subscribers.push(tx);
        rx
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn tracked(&self) -> &TrackedSet {
        &self.set
    }

    /// Applies one command at `now_ms`.
    pub fn apply(&mut self, cmd: Command, now_ms: u64) {
        match cmd {
            Command::Feed(event) => self.on_feed_event(event, now_ms),
            Command::Track(mint) => self.on_track(&mint, now_ms),
            Command::TogglePin(mint) => match self.set.toggle_pin(&mint) {
                Some(pinned) => info!(mint = %mint, pinned, "pin toggled"),
                None => debug!(mint = %mint, "pin toggle for absent mint ignored"),
            },
            Command::ToggleTrack(mint) => match self.set.toggle_track(&mint) {
                Some(tracked) => info!(mint = %mint, tracked, "track toggled"),
                None => debug!(mint = %mint, "track toggle for absent mint ignored"),
            },
            Command::Untrack(mint) => {
                if self.set.get(&mint).is_some_and(|r| r.is_pinned) {
                    self.set.toggle_pin(&mint);
                }
                if self.set.get(&mint).is_some_and(|r| r.is_tracked) {
                    self.set.toggle_track(&mint);
                }
                info!(mint = %mint, "untracked");
            }
            Command::ApplySettings(input) => {
                self.apply_settings(input);
            }
            Command::PatchSettings { patches, reply } => {
                let outcome = self.patch_settings(patches);
                if reply.send(outcome).is_err() {
                    debug!("settings patch requester went away");
                }
            }
            Command::SetSort(sort) => {
                info!(%sort, "sort order changed");
                self.sort = sort;
            }
        }
        self.publish_watched();
    }

    fn on_feed_event(&mut self, event: FeedEvent, now_ms: u64) {
        match event {
            FeedEvent::Created(coin) => {
                bump(&self.counters.discovered);
                let seed = AssetSeed::from(&coin);
                let admission = self
                    .set
                    .on_discovered(seed, now_ms, self.config.max_coins_to_track);
                self.record_admission(&coin.mint, admission);
            }
            FeedEvent::Migrated { mint } => {
                if self.set.on_migration_exit(&mint).is_some() {
                    bump(&self.counters.migrated);
                    self.alerts.forget(&mint);
                }
            }
            FeedEvent::CurveUpdated {
                mint,
                sol_in_curve,
                market_cap_sol,
            } => {
                self.set.on_curve_update(&mint, sol_in_curve, market_cap_sol);
            }
            FeedEvent::Trade { mint, trade } => {
                let outcome = self.set.on_trade_event(&mint, trade);
                self.record_trade(outcome);
            }
            FeedEvent::OpeningBalance { mint, trade } => {
                let outcome = self.set.on_opening_balance(&mint, trade);
                self.record_trade(outcome);
            }
        }
    }

    fn record_trade(&self, outcome: TradeOutcome) {
        let counter = match outcome {
            TradeOutcome::Appended => &self.counters.trades_appended,
            TradeOutcome::UnknownMint => &self.counters.trades_unknown_mint,
            TradeOutcome::Rejected(_) => &self.counters.trades_rejected,
            TradeOutcome::Baseline => &self.counters.opening_baselines,
        };
        bump(counter);
    }

    fn on_track(&mut self, mint: &str, now_ms: u64) {
        let mint = mint.trim();
        if mint.is_empty() {
            warn!("empty track request ignored");
            return;
        }
        let admission = self
            .set
            .on_track_requested(mint, now_ms, self.config.max_coins_to_track);
        info!(mint, ?admission, "track requested");
        self.record_admission(mint, admission);
    }

    fn record_admission(&mut self, mint: &str, admission: Admission) {
        match admission {
            Admission::Inserted => bump(&self.counters.admitted),
            Admission::InsertedAfterEvicting(victim) => {
                bump(&self.counters.admitted);
                bump(&self.counters.evicted);
                self.alerts.forget(&victim);
            }
            Admission::AlreadyPresent => debug!(mint, "already tracked"),
            Admission::Refused => bump(&self.counters.refused),
        }
    }

    /// Replaces the config atomically. Takes effect on the next tick.
    #[instrument(skip_all)]
    pub fn apply_settings(&mut self, input: SettingsInput) -> u64 {
        let next = ScannerConfig::from_settings(&input, self.config.version + 1);
        for victim in self.set.enforce_capacity(next.max_coins_to_track) {
            bump(&self.counters.evicted);
            self.alerts.forget(&victim);
        }
        info!(
            version = next.version,
            max_coins = next.max_coins_to_track,
            refresh_ms = next.refresh_interval_ms,
            momentum_threshold = next.momentum_threshold,
            "settings applied"
        );
        self.settings = input;
        self.config = next;
        self.config.version
    }

    fn patch_settings(&mut self, patches: Vec<(String, String)>) -> Result<u64, MarketError> {
        let mut input = self.settings.clone();
        for (key, value) in &patches {
            input.patch(key, value)?;
        }
        Ok(self.apply_settings(input))
    }

    fn publish_watched(&self) {
        let set = &self.set;
        self.watched_tx.send_if_modified(|current| {
            if current.len() == set.len() && current.iter().all(|m| set.contains(m)) {
                return false;
            }
            *current = Arc::new(set.mints());
            true
        });
    }

    /// prune → aggregate → classify → alert → rank, under one config snapshot.
    pub fn tick(&mut self, now_ms: u64) -> Arc<TickReport> {
        let cfg = self.config.clone();
        let changes = self.set.refresh_all(now_ms, &cfg);

        self.alerts.expire(now_ms);
        let mut new_alerts = Vec::new();
        for (mint, change) in changes {
            let Some(record) = self.set.get(&mint) else {
                continue;
            };
            if let Some(alert) = self.alerts.observe(&mint, &record.symbol, change, now_ms) {
                info!(mint = %mint, kind = ?alert.kind, "signal alert");
                bump(&self.counters.alerts);
                new_alerts.push(alert);
            }
        }
        new_alerts.sort_by(|a, b| a.mint.cmp(&b.mint));

        let (rows, stats) = rank(self.set.records(), &cfg, self.sort);
        bump(&self.counters.ticks);

        let counters = self.counters.snapshot();
        debug!(
            tracked = self.set.len(),
            shown = rows.len(),
            buys = stats.buy_signals,
            sells = stats.sell_signals,
            ?counters,
            "tick"
        );

        let report = Arc::new(TickReport {
            ts_ms: now_ms,
            config: cfg,
            sort: self.sort,
            rows,
            stats,
            new_alerts,
            active_alerts: self.alerts.active().to_vec(),
            counters,
        });

        for sub in &self.subscribers {
            if let Err(e) = sub.try_send(Arc::clone(&report)) {
                warn!(error = %e, "failed to deliver tick report (subscriber full or closed)");
            }
        }
        report
    }

    /// Command + tick loop. Stops on shutdown or when every handle is gone.
    #[instrument(name = "market_manager", skip_all)]
    pub async fn run(mut self, shutdown: ShutdownSignal) {
        let Some(mut commands) = self.commands.take() else {
            warn!("market manager already ran");
            return;
        };

        let mut period = self.config.refresh_interval_ms;
        let mut ticker = tick_interval(period);
        info!(refresh_ms = period, "market manager started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.wait() => break,

                // ahead of commands: a busy feed must not hold back the tick
                _ = ticker.tick() => {
                    let now = (self.clock)();
                    let budget = Duration::from_millis(period);
                    let report = warn_if_slow("market_tick", budget, async { self.tick(now) }).await;
                    self.view.set(report).await;
                }

                cmd = commands.recv() => match cmd {
                    Some(cmd) => {
                        let now = (self.clock)();
                        self.apply(cmd, now);
                    }
                    None => {
                        info!("command channel closed");
                        break;
                    }
                },
            }

            if self.config.refresh_interval_ms != period {
                period = self.config.refresh_interval_ms;
                ticker = tick_interval(period);
                info!(refresh_ms = period, "tick interval changed");
            }
        }

        info!("market manager stopped");
    }
}

/// First tick one period out, so commands already queued land before it.
fn tick_interval(period_ms: u64) -> Interval {
    let period = Duration::from_millis(period_ms.max(1));
    let mut t = tokio::time::interval_at(Instant::now() + period, period);
    t.set_missed_tick_behavior(MissedTickBehavior::Skip);
    t
}

/// Cloneable front door to a running [`MarketManager`].
#[derive(Clone)]
pub struct MarketHandle {
    tx: mpsc::Sender<Command>,
    view: ScannerView,
    watched: watch::Receiver<WatchedMints>,
    counters: Counters,
}

impl MarketHandle {
    pub async fn send(&self, cmd: Command) -> Result<(), MarketError> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| MarketError::ManagerStopped)
    }

    pub async fn feed(&self, event: FeedEvent) -> Result<(), MarketError> {
        self.send(Command::Feed(event)).await
    }

    pub async fn track(&self, mint: impl Into<String>) -> Result<(), MarketError> {
        self.send(Command::Track(mint.into())).await
    }

    pub async fn toggle_pin(&self, mint: impl Into<String>) -> Result<(), MarketError> {
        self.send(Command::TogglePin(mint.into())).await
    }

    pub async fn toggle_track(&self, mint: impl Into<String>) -> Result<(), MarketError> {
        self.send(Command::ToggleTrack(mint.into())).await
    }

    pub async fn untrack(&self, mint: impl Into<String>) -> Result<(), MarketError> {
        self.send(Command::Untrack(mint.into())).await
    }

    pub async fn apply_settings(&self, input: SettingsInput) -> Result<(), MarketError> {
        self.send(Command::ApplySettings(input)).await
    }

    /// Applies `key=value` edits and waits for the resulting config version.
    pub async fn patch_settings(&self, patches: Vec<(String, String)>) -> Result<u64, MarketError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::PatchSettings { patches, reply }).await?;
        rx.await.map_err(|_| MarketError::ManagerStopped)?
    }

    pub async fn set_sort(&self, sort: SortSpec) -> Result<(), MarketError> {
        self.send(Command::SetSort(sort)).await
    }

    pub async fn latest(&self) -> Option<Arc<TickReport>> {
        self.view.latest().await
    }

    /// Receiver of the tracked-mint set; changes whenever membership does.
    pub fn watched(&self) -> watch::Receiver<WatchedMints> {
        self.watched.clone()
    }

    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }
}
