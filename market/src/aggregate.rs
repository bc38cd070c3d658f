//! Multi-horizon volume / count / side aggregation over a [`WindowStore`].
//!
//! Every tick rescans the retained events. Retention is capped at five
//! minutes and the tracked set is bounded, so the scan stays small.

use serde::Serialize;

use crate::window::WindowStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Horizon {
    S15,
    S30,
    M1,
    M5,
}

impl Horizon {
    pub const ALL: [Horizon; 4] = [Horizon::S15, Horizon::S30, Horizon::M1, Horizon::M5];

    pub fn millis(self) -> u64 {
        match self {
            Horizon::S15 => 15_000,
            Horizon::S30 => 30_000,
            Horizon::M1 => 60_000,
            Horizon::M5 => 300_000,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Horizon::S15 => "15s",
            Horizon::S30 => "30s",
            Horizon::M1 => "1m",
            Horizon::M5 => "5m",
        }
    }

    fn index(self) -> usize {
        match self {
            Horizon::S15 => 0,
            Horizon::S30 => 1,
            Horizon::M1 => 2,
            Horizon::M5 => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct HorizonMetrics {
    pub volume: f64,
    pub tx_count: u32,
    pub buys: u32,
    pub sells: u32,
}

/// Aggregates for all four horizons at one reference instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct WindowMetrics {
    pub computed_at_ms: u64,
    horizons: [HorizonMetrics; 4],
}

impl WindowMetrics {
    pub fn get(&self, h: Horizon) -> &HorizonMetrics {
        &self.horizons[h.index()]
    }

    pub fn volume(&self, h: Horizon) -> f64 {
        self.get(h).volume
    }

    pub fn tx_count(&self, h: Horizon) -> u32 {
        self.get(h).tx_count
    }

    pub fn buys(&self, h: Horizon) -> u32 {
        self.get(h).buys
    }

    pub fn sells(&self, h: Horizon) -> u32 {
        self.get(h).sells
    }
}

/// `volume(h) = Σ amount` over events with `ts >= now - h`; counts split by direction.
pub fn aggregate(store: &WindowStore, now_ms: u64) -> WindowMetrics {
    let mut out = WindowMetrics {
        computed_at_ms: now_ms,
        ..Default::default()
    };

    for event in store.iter() {
        for h in Horizon::ALL {
            if event.ts_ms() < now_ms.saturating_sub(h.millis()) {
                continue;
            }
            let slot = &mut out.horizons[h.index()];
            slot.volume += event.amount();
            slot.tx_count += 1;
            if event.is_buy() {
                slot.buys += 1;
            } else {
                slot.sells += 1;
            }
        }
    }

    out
}
