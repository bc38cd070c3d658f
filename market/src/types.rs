use std::collections::BTreeSet;
use std::sync::Arc;

use corelib::FeedEvent;
use serde::Serialize;
use tokio::sync::oneshot;

use crate::alerts::Alert;
use crate::config::{ScannerConfig, SettingsInput};
use crate::error::MarketError;
use crate::metrics::CounterSnapshot;
use crate::ranking::{CoinView, SortSpec, Stats};

/// Mints currently held by the tracked set, as published to the feeds.
pub type WatchedMints = Arc<BTreeSet<String>>;

/// Discrete mutations, applied one at a time by the manager.
#[derive(Debug)]
pub enum Command {
    Feed(FeedEvent),
    Track(String),
    TogglePin(String),
    ToggleTrack(String),
    /// Clears both pin and track flags so the entry becomes evictable again.
    Untrack(String),
    ApplySettings(SettingsInput),
    /// `key=value` edits on top of the last applied settings. Replies with the
    /// new config version.
    PatchSettings {
        patches: Vec<(String, String)>,
        reply: oneshot::Sender<Result<u64, MarketError>>,
    },
    SetSort(SortSpec),
}

/// Output of one tick: filtered, ranked rows plus everything a view needs.
#[derive(Clone, Debug, Serialize)]
pub struct TickReport {
    pub ts_ms: u64,
    pub config: ScannerConfig,
    pub sort: SortSpec,
    pub rows: Vec<CoinView>,
    pub stats: Stats,
    /// Alerts fired by this tick.
    pub new_alerts: Vec<Alert>,
    /// Alerts still within their display lifetime.
    pub active_alerts: Vec<Alert>,
    pub counters: CounterSnapshot,
}
