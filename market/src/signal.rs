//! Signal classification.
//!
//! Both functions here are pure: same inputs, same answer, no state.

use std::fmt;

use serde::Serialize;

/// Minimum buy/sell ratio for a BUY.
pub const BUY_MIN_RATIO: f64 = 2.0;
/// Momentum at or below which a SELL is possible.
pub const SELL_MAX_MOMENTUM: f64 = 0.5;
/// Buy/sell ratio at or below which a SELL is possible.
pub const SELL_MAX_RATIO: f64 = 0.8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

/// First matching rule wins: BUY, then SELL, otherwise HOLD.
pub fn classify(
    momentum: f64,
    buy_sell_ratio: f64,
    liquidity_change: f64,
    momentum_threshold: f64,
) -> Signal {
    if momentum >= momentum_threshold && buy_sell_ratio >= BUY_MIN_RATIO && liquidity_change >= 0.0
    {
        return Signal::Buy;
    }

    if momentum <= SELL_MAX_MOMENTUM && buy_sell_ratio <= SELL_MAX_RATIO && liquidity_change < 0.0
    {
        return Signal::Sell;
    }

    Signal::Hold
}

/// Advisory holding recommendation. Never feeds eviction or filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum HoldHint {
    StrongBuy,
    ModerateBuy,
    Monitor,
    ModerateSell,
    StrongSell,
}

impl HoldHint {
    pub fn text(self) -> &'static str {
        match self {
            HoldHint::StrongBuy => "Strong buy - Hold for 15-30 min",
            HoldHint::ModerateBuy => "Moderate buy - Hold for 5-15 min",
            HoldHint::Monitor => "Hold - Monitor closely",
            HoldHint::ModerateSell => "Moderate sell - Exit within 1 min",
            HoldHint::StrongSell => "Strong sell - Exit immediately",
        }
    }
}

impl fmt::Display for HoldHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

pub fn hold_time_hint(momentum: f64, buy_sell_ratio: f64, liquidity_change: f64) -> HoldHint {
    if momentum >= 4.0 && buy_sell_ratio >= 4.0 && liquidity_change >= 20.0 {
        HoldHint::StrongBuy
    } else if momentum >= 3.0 && buy_sell_ratio >= 3.0 && liquidity_change >= 10.0 {
        HoldHint::ModerateBuy
    } else if momentum <= 0.7 && buy_sell_ratio <= 0.8 && liquidity_change < -10.0 {
        HoldHint::StrongSell
    } else if momentum <= 1.0 && buy_sell_ratio <= 1.0 && liquidity_change < -5.0 {
        HoldHint::ModerateSell
    } else {
        HoldHint::Monitor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn classify_literal_cases() {
        assert_eq!(classify(3.0, 3.0, 5.0, 2.0), Signal::Buy);
        assert_eq!(classify(0.4, 0.5, -5.0, 2.0), Signal::Sell);
        assert_eq!(classify(1.0, 1.0, 1.0, 2.0), Signal::Hold);
    }

    #[test]
    fn classify_boundaries_are_inclusive() {
        assert_eq!(classify(2.0, 2.0, 0.0, 2.0), Signal::Buy);
        assert_eq!(classify(0.5, 0.8, -0.0001, 2.0), Signal::Sell);
        // Zero liquidity change is never a SELL.
        assert_eq!(classify(0.0, 0.0, 0.0, 2.0), Signal::Hold);
    }

    #[test]
    fn buy_requires_every_condition() {
        assert_eq!(classify(1.9, 5.0, 5.0, 2.0), Signal::Hold);
        assert_eq!(classify(5.0, 1.9, 5.0, 2.0), Signal::Hold);
        assert_eq!(classify(5.0, 5.0, -0.1, 2.0), Signal::Hold);
    }

    #[test]
    fn threshold_comes_from_caller() {
        assert_eq!(classify(3.0, 3.0, 0.0, 4.0), Signal::Hold);
        assert_eq!(classify(3.0, 3.0, 0.0, 1.0), Signal::Buy);
    }

    #[test]
    fn hold_hint_bands() {
        assert_eq!(hold_time_hint(5.0, 5.0, 25.0), HoldHint::StrongBuy);
        assert_eq!(hold_time_hint(3.5, 3.0, 10.0), HoldHint::ModerateBuy);
        assert_eq!(hold_time_hint(0.5, 0.5, -20.0), HoldHint::StrongSell);
        assert_eq!(hold_time_hint(0.9, 1.0, -6.0), HoldHint::ModerateSell);
        assert_eq!(hold_time_hint(2.0, 2.0, 0.0), HoldHint::Monitor);
        assert_eq!(HoldHint::Monitor.to_string(), "Hold - Monitor closely");
    }

    #[test]
    fn signal_displays_uppercase() {
        assert_eq!(Signal::Buy.to_string(), "BUY");
        assert_eq!(Signal::Sell.to_string(), "SELL");
        assert_eq!(Signal::Hold.to_string(), "HOLD");
    }

    proptest! {
        #[test]
        fn more_momentum_never_turns_buy_into_something_else(
            m in 0.0f64..20.0,
            bump in 0.0f64..20.0,
            r in 0.0f64..10.0,
            liq in -50.0f64..50.0,
            threshold in 0.5f64..10.0,
        ) {
            if classify(m, r, liq, threshold) == Signal::Buy {
                prop_assert_eq!(classify(m + bump, r, liq, threshold), Signal::Buy);
            }
        }
    }
}
