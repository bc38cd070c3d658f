use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Minimal counters for operational visibility.
#[derive(Clone, Debug, Default)]
pub struct Counters {
    pub discovered: Arc<AtomicU64>,
    pub admitted: Arc<AtomicU64>,
    pub evicted: Arc<AtomicU64>,
    pub refused: Arc<AtomicU64>,
    pub migrated: Arc<AtomicU64>,

    // trade outcomes
    pub trades_appended: Arc<AtomicU64>,
    pub trades_rejected: Arc<AtomicU64>,
    pub trades_unknown_mint: Arc<AtomicU64>,
    pub opening_baselines: Arc<AtomicU64>,

    pub ticks: Arc<AtomicU64>,
    pub alerts: Arc<AtomicU64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub discovered: u64,
    pub admitted: u64,
    pub evicted: u64,
    pub refused: u64,
    pub migrated: u64,
    pub trades_appended: u64,
    pub trades_rejected: u64,
    pub trades_unknown_mint: u64,
    pub opening_baselines: u64,
    pub ticks: u64,
    pub alerts: u64,
}

pub(crate) fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl Counters {
    pub fn snapshot(&self) -> CounterSnapshot {
        let get = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CounterSnapshot {
            discovered: get(&self.discovered),
            admitted: get(&self.admitted),
            evicted: get(&self.evicted),
            refused: get(&self.refused),
            migrated: get(&self.migrated),
            trades_appended: get(&self.trades_appended),
            trades_rejected: get(&self.trades_rejected),
            trades_unknown_mint: get(&self.trades_unknown_mint),
            opening_baselines: get(&self.opening_baselines),
            ticks: get(&self.ticks),
            alerts: get(&self.alerts),
        }
    }
}
