//! Market Pulse Abstraction
//!
//! A pulse consumes exactly one input per tick and produces a reading. Pulses
//! that need history (liquidity change) own it; the others are stateless.

pub mod liquidity;
pub mod momentum;

pub use self::liquidity::LiquidityPulse;
pub use self::momentum::{BuySellRatio, MomentumPulse, MomentumReading};

/// Core Pulse trait.
pub trait Pulse {
    /// Input type consumed per tick
    type Input;

    /// Output type produced per tick
    type Output;

    fn evaluate(&mut self, input: Self::Input) -> Self::Output;
}
