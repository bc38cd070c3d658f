use serde::Serialize;

use super::Pulse;
use crate::aggregate::{Horizon, WindowMetrics};

/// Seconds in the five-minute baseline; scales its volume to a per-second rate.
const BASELINE_SECS: f64 = 300.0;

/// Buy / sell counts over the five-minute horizon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BuySellRatio {
    pub buys: u32,
    pub sells: u32,
}

impl BuySellRatio {
    /// `buys / sells`, or `buys` when there are no sells.
    pub fn value(&self) -> f64 {
        if self.sells > 0 {
            self.buys as f64 / self.sells as f64
        } else {
            self.buys as f64
        }
    }

    /// `"buys:sells"`, `"0:0"` when nothing traded.
    pub fn label(&self) -> String {
        format!("{}:{}", self.buys, self.sells)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MomentumReading {
    /// 15s volume relative to the per-second 5m baseline.
    pub momentum: f64,
    /// Transactions in the last minute.
    pub velocity: u32,
    /// 5m transactions per second.
    pub avg_transactions: f64,
    pub buy_sell: BuySellRatio,
}

/// `momentum = volume15s / (volume5m / 300)`, 0 when the baseline is empty.
///
/// 15s events are a subset of the 5m events, so adding short-window volume
/// never lowers the value.
#[derive(Clone, Copy, Debug, Default)]
pub struct MomentumPulse;

impl Pulse for MomentumPulse {
    type Input = WindowMetrics;
    type Output = MomentumReading;

    fn evaluate(&mut self, m: Self::Input) -> Self::Output {
        let baseline = m.volume(Horizon::M5) / BASELINE_SECS;
        let momentum = if baseline > 0.0 {
            m.volume(Horizon::S15) / baseline
        } else {
            0.0
        };

        MomentumReading {
            momentum,
            velocity: m.tx_count(Horizon::M1),
            avg_transactions: m.tx_count(Horizon::M5) as f64 / BASELINE_SECS,
            buy_sell: BuySellRatio {
                buys: m.buys(Horizon::M5),
                sells: m.sells(Horizon::M5),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::window::WindowStore;
    use corelib::{Direction, TradeEvent};
    use proptest::prelude::*;

    const NOW: u64 = 10_000_000;

    fn metrics(events: &[(u64, f64, Direction)]) -> WindowMetrics {
        let mut store = WindowStore::new();
        for (secs_ago, amount, dir) in events {
            store.append(TradeEvent::new(NOW - secs_ago * 1_000, *amount, *dir).unwrap());
        }
        aggregate(&store, NOW)
    }

    #[test]
    fn momentum_is_zero_without_baseline() {
        let r = MomentumPulse.evaluate(WindowMetrics::default());
        assert_eq!(r.momentum, 0.0);
        assert_eq!(r.buy_sell.label(), "0:0");
        assert_eq!(r.buy_sell.value(), 0.0);
    }

    #[test]
    fn momentum_compares_short_volume_with_baseline_rate() {
        // 5m volume 30 => 0.1/s baseline; 15s volume 10 => momentum 100.
        let m = metrics(&[
            (5, 10.0, Direction::Buy),
            (120, 20.0, Direction::Sell),
        ]);
        let r = MomentumPulse.evaluate(m);

        assert!((r.momentum - 100.0).abs() < 1e-9);
        assert_eq!(r.velocity, 1);
        assert!((r.avg_transactions - 2.0 / 300.0).abs() < 1e-12);
        assert_eq!(r.buy_sell, BuySellRatio { buys: 1, sells: 1 });
    }

    #[test]
    fn ratio_without_sells_is_buy_count() {
        let r = BuySellRatio { buys: 4, sells: 0 };
        assert_eq!(r.value(), 4.0);
        assert_eq!(BuySellRatio { buys: 3, sells: 2 }.value(), 1.5);
    }

    proptest! {
        #[test]
        fn short_window_buy_never_lowers_momentum(
            history in proptest::collection::vec((16u64..299, 0.1f64..50.0), 1..40),
            recent in proptest::collection::vec((0u64..15, 0.1f64..50.0), 0..10),
            extra in 0.1f64..50.0,
        ) {
            let mut events: Vec<(u64, f64, Direction)> = history
                .iter()
                .chain(recent.iter())
                .map(|(s, a)| (*s, *a, Direction::Sell))
                .collect();
            let before = MomentumPulse.evaluate(metrics(&events)).momentum;

            events.push((1, extra, Direction::Buy));
            let after = MomentumPulse.evaluate(metrics(&events)).momentum;

            prop_assert!(after + 1e-9 >= before);
        }
    }
}
