use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side of an ownership transfer, seen from the holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

/// A trade as reported upstream, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeObservation {
    /// Milliseconds since the Unix epoch. `None` when the source had no usable time.
    pub ts_ms: Option<u64>,
    pub amount: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TradeRejection {
    #[error("trade has no timestamp")]
    MissingTimestamp,

    #[error("trade amount {0} is not a finite non-negative number")]
    InvalidAmount(f64),
}

/// A validated, immutable trade record for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeEvent {
    ts_ms: u64,
    amount: f64,
    direction: Direction,
}

impl TradeEvent {
    pub fn new(ts_ms: u64, amount: f64, direction: Direction) -> Result<Self, TradeRejection> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(TradeRejection::InvalidAmount(amount));
        }
        Ok(Self {
            ts_ms,
            amount,
            direction,
        })
    }

    pub fn ts_ms(&self) -> u64 {
        self.ts_ms
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_buy(&self) -> bool {
        self.direction == Direction::Buy
    }
}

impl TryFrom<TradeObservation> for TradeEvent {
    type Error = TradeRejection;

    fn try_from(obs: TradeObservation) -> Result<Self, Self::Error> {
        let ts_ms = obs.ts_ms.ok_or(TradeRejection::MissingTimestamp)?;
        TradeEvent::new(ts_ms, obs.amount, obs.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_without_timestamp_is_rejected() {
        let obs = TradeObservation {
            ts_ms: None,
            amount: 1.0,
            direction: Direction::Buy,
        };
        assert_eq!(
            TradeEvent::try_from(obs),
            Err(TradeRejection::MissingTimestamp)
        );
    }

    #[test]
    fn negative_and_nan_amounts_are_rejected() {
        assert!(matches!(
            TradeEvent::new(1, -0.5, Direction::Sell),
            Err(TradeRejection::InvalidAmount(_))
        ));
        assert!(matches!(
            TradeEvent::new(1, f64::NAN, Direction::Sell),
            Err(TradeRejection::InvalidAmount(_))
        ));
    }

    #[test]
    fn valid_observation_converts() {
        let obs = TradeObservation {
            ts_ms: Some(42),
            amount: 0.0,
            direction: Direction::Sell,
        };
        let ev = TradeEvent::try_from(obs).unwrap();
        assert_eq!(ev.ts_ms(), 42);
        assert!(!ev.is_buy());
    }
}
