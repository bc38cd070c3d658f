#![allow(dead_code)]

use corelib::{CoinCreated, Direction, FeedEvent, TradeObservation};

pub const NOW: u64 = 1_700_000_000_000;

pub fn created(mint: &str, liquidity: f64) -> FeedEvent {
    FeedEvent::Created(CoinCreated {
        mint: mint.into(),
        name: format!("{mint} coin"),
        symbol: mint.to_uppercase(),
        sol_in_curve: liquidity,
        tokens_in_curve: 1_000_000.0,
        market_cap_sol: 30.0,
    })
}

pub fn trade(mint: &str, ts_ms: u64, amount: f64, direction: Direction) -> FeedEvent {
    FeedEvent::Trade {
        mint: mint.into(),
        trade: TradeObservation {
            ts_ms: Some(ts_ms),
            amount,
            direction,
        },
    }
}
