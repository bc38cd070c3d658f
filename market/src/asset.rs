use corelib::{CoinCreated, TradeEvent};
use serde::Serialize;

use crate::aggregate::{WindowMetrics, aggregate};
use crate::config::ScannerConfig;
use crate::pulse::{LiquidityPulse, MomentumPulse, MomentumReading, Pulse};
use crate::signal::{HoldHint, Signal, classify, hold_time_hint};
use crate::window::WindowStore;

/// Seed fields carried by a discovery event.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetSeed {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub liquidity: f64,
    pub market_cap: f64,
    pub price: f64,
}

impl From<&CoinCreated> for AssetSeed {
    fn from(c: &CoinCreated) -> Self {
        Self {
            mint: c.mint.clone(),
            name: c.name.clone(),
            symbol: c.symbol.clone(),
            liquidity: c.sol_in_curve,
            market_cap: c.market_cap_sol,
            price: c.price(),
        }
    }
}

impl AssetSeed {
    /// Placeholder seed for an explicit track request with no discovery data.
    pub fn unnamed(mint: &str) -> Self {
        let short: String = mint.chars().take(6).collect();
        Self {
            mint: mint.to_string(),
            name: short.clone(),
            symbol: short,
            liquidity: 0.0,
            market_cap: 0.0,
            price: 0.0,
        }
    }
}

/// Everything computed for one asset on the last tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    pub metrics: WindowMetrics,
    pub reading: MomentumReading,
    pub liquidity_change: f64,
    pub signal: Signal,
    pub hold_hint: HoldHint,
    pub is_active: bool,
}

impl Default for Evaluation {
    fn default() -> Self {
        Self {
            metrics: WindowMetrics::default(),
            reading: MomentumReading::default(),
            liquidity_change: 0.0,
            signal: Signal::Hold,
            hold_hint: HoldHint::Monitor,
            is_active: false,
        }
    }
}

/// Signal change produced by a refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignalChange {
    pub previous: Signal,
    pub current: Signal,
}

#[derive(Clone, Debug)]
pub struct AssetRecord {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub is_pinned: bool,
    pub is_tracked: bool,
    pub pre_migration: bool,
    /// Admitted by discovery, so every holder started from a zero balance.
    pub watched_since_creation: bool,
    pub added_at_ms: u64,
    /// Tie-break for entries added in the same millisecond.
    pub(crate) seq: u64,
    pub liquidity: f64,
    pub market_cap: f64,
    pub price: f64,
    /// Admission time, then the instant of the latest signal change.
    pub last_updated_ms: u64,
    window: WindowStore,
    liquidity_pulse: LiquidityPulse,
    evaluation: Evaluation,
}

impl AssetRecord {
    pub(crate) fn new(seed: AssetSeed, added_at_ms: u64, seq: u64) -> Self {
        Self {
            mint: seed.mint,
            name: seed.name,
            symbol: seed.symbol,
            is_pinned: false,
            is_tracked: false,
            pre_migration: true,
            watched_since_creation: false,
            added_at_ms,
            seq,
            liquidity: seed.liquidity,
            market_cap: seed.market_cap,
            price: seed.price,
            last_updated_ms: added_at_ms,
            window: WindowStore::new(),
            liquidity_pulse: LiquidityPulse::new(),
            evaluation: Evaluation::default(),
        }
    }

    pub fn window(&self) -> &WindowStore {
        &self.window
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn signal(&self) -> Signal {
        self.evaluation.signal
    }

    pub fn prev_liquidity(&self) -> Option<f64> {
        self.liquidity_pulse.prev_liquidity()
    }

    pub(crate) fn append(&mut self, event: TradeEvent) {
        self.window.append(event);
    }

    /// prune → aggregate → pulses → classify. Overwrites the cached evaluation.
    pub(crate) fn refresh(&mut self, now_ms: u64, cfg: &ScannerConfig) -> SignalChange {
        self.window.prune(now_ms);

        let metrics = aggregate(&self.window, now_ms);
        let reading = MomentumPulse.evaluate(metrics);
        let liquidity_change = self.liquidity_pulse.evaluate(self.liquidity);
        let ratio = reading.buy_sell.value();

        let previous = self.evaluation.signal;
        self.evaluation = Evaluation {
            metrics,
            reading,
            liquidity_change,
            signal: classify(
                reading.momentum,
                ratio,
                liquidity_change,
                cfg.momentum_threshold,
            ),
            hold_hint: hold_time_hint(reading.momentum, ratio, liquidity_change),
            is_active: reading.velocity as f64 >= cfg.velocity_threshold,
        };
        if self.evaluation.signal != previous {
            self.last_updated_ms = now_ms;
        }

        SignalChange {
            previous,
            current: self.evaluation.signal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Horizon;
    use corelib::Direction;

    const NOW: u64 = 5_000_000;

    fn record() -> AssetRecord {
        AssetRecord::new(
            AssetSeed {
                mint: "MintA".into(),
                name: "Alpha".into(),
                symbol: "ALP".into(),
                liquidity: 30.0,
                market_cap: 40.0,
                price: 0.0001,
            },
            NOW - 60_000,
            0,
        )
    }

    #[test]
    fn refresh_classifies_buy_pressure() {
        let mut r = record();
        let cfg = ScannerConfig::default();
        // Quiet baseline followed by a burst of buys.
        r.append(TradeEvent::new(NOW - 200_000, 1.0, Direction::Sell).unwrap());
        for i in 0..4 {
            r.append(TradeEvent::new(NOW - 1_000 * i, 2.0, Direction::Buy).unwrap());
        }

        let change = r.refresh(NOW, &cfg);

        assert_eq!(change.previous, Signal::Hold);
        assert_eq!(change.current, Signal::Buy);
        assert_eq!(r.evaluation().metrics.tx_count(Horizon::M5), 5);
        assert!(r.evaluation().is_active);
        assert_eq!(r.last_updated_ms, NOW);
    }

    #[test]
    fn refresh_classifies_sell_on_draining_liquidity() {
        let mut r = record();
        let cfg = ScannerConfig::default();
        r.append(TradeEvent::new(NOW - 100_000, 5.0, Direction::Sell).unwrap());
        r.append(TradeEvent::new(NOW - 90_000, 5.0, Direction::Sell).unwrap());
        r.refresh(NOW, &cfg);

        r.liquidity = 20.0;
        let change = r.refresh(NOW + 1_000, &cfg);

        assert_eq!(change.current, Signal::Sell);
        assert!(r.evaluation().liquidity_change < 0.0);
        assert_eq!(r.prev_liquidity(), Some(20.0));
    }

    #[test]
    fn refresh_prunes_expired_history() {
        let mut r = record();
        r.append(TradeEvent::new(NOW - 400_000, 5.0, Direction::Buy).unwrap());
        r.refresh(NOW, &ScannerConfig::default());
        assert!(r.window().is_empty());
    }

    #[test]
    fn unnamed_seed_uses_mint_prefix() {
        let seed = AssetSeed::unnamed("So11111111111111111111111111111111111111112");
        assert_eq!(seed.name, "So1111");
        assert_eq!(seed.liquidity, 0.0);
    }
}
