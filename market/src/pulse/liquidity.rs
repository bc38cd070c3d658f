use super::Pulse;

/// One-tick-lagged liquidity change in percent.
///
/// `prev` is replaced with the current liquidity after every evaluation, so
/// the reading is the change since the previous tick, not a derivative.
#[derive(Clone, Copy, Debug, Default)]
pub struct LiquidityPulse {
    prev: Option<f64>,
}

impl LiquidityPulse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prev_liquidity(&self) -> Option<f64> {
        self.prev
    }
}

impl Pulse for LiquidityPulse {
    type Input = f64;
    type Output = f64;

    fn evaluate(&mut self, liquidity: Self::Input) -> Self::Output {
        let change = match self.prev {
            Some(prev) if prev != 0.0 => (liquidity - prev) / prev * 100.0,
            _ => 0.0,
        };
        self.prev = Some(liquidity);
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_no_change() {
        let mut p = LiquidityPulse::new();
        assert_eq!(p.evaluate(30.0), 0.0);
        assert_eq!(p.prev_liquidity(), Some(30.0));
    }

    #[test]
    fn change_is_relative_to_previous_tick() {
        let mut p = LiquidityPulse::new();
        p.evaluate(40.0);
        assert!((p.evaluate(30.0) - -25.0).abs() < 1e-9);
        assert_eq!(p.evaluate(30.0), 0.0);
    }

    #[test]
    fn zero_previous_liquidity_yields_zero() {
        let mut p = LiquidityPulse::new();
        p.evaluate(0.0);
        assert_eq!(p.evaluate(12.0), 0.0);
    }
}
