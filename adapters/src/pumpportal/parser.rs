//! PumpPortal data frame parser.
//!
//! ```jsonc
//! { "txType": "create", "mint": "...", "name": "...", "symbol": "...",
//!   "vSolInBondingCurve": 30.0, "vTokensInBondingCurve": 1.07e9, "marketCapSol": 28.0 }
//! { "txType": "migrate", "mint": "..." }
//! { "txType": "buy" | "sell", "mint": "...", "vSolInBondingCurve": 31.2, "marketCapSol": 29.1 }
//! { "message": "Successfully subscribed to token creation events." }
//! ```

use corelib::{CoinCreated, FeedEvent};

use super::types::PumpMessage;
use crate::error::FeedError;

pub fn parse_pump_message(raw: &str) -> Result<Option<FeedEvent>, FeedError> {
    let msg: PumpMessage = serde_json::from_str(raw)?;

    if let Some(errors) = msg.errors {
        return Err(FeedError::Rpc(errors));
    }

    let Some(tx_type) = msg.tx_type.as_deref() else {
        // acknowledgements and anything without a txType
        return Ok(None);
    };

    match tx_type {
        "create" => {
            let mint = required(msg.mint, "mint")?;
            let name = required(msg.name, "name")?;
            let symbol = required(msg.symbol, "symbol")?;
            Ok(Some(FeedEvent::Created(CoinCreated {
                mint,
                name,
                symbol,
                sol_in_curve: number(msg.v_sol_in_bonding_curve, "vSolInBondingCurve")?,
                tokens_in_curve: number(msg.v_tokens_in_bonding_curve, "vTokensInBondingCurve")?,
                market_cap_sol: number(msg.market_cap_sol, "marketCapSol")?,
            })))
        }
        "migrate" => Ok(Some(FeedEvent::Migrated {
            mint: required(msg.mint, "mint")?,
        })),
        "buy" | "sell" => {
            let mint = required(msg.mint, "mint")?;
            let sol = msg
                .v_sol_in_bonding_curve
                .ok_or(FeedError::MissingField("vSolInBondingCurve"))?;
            let market_cap = msg
                .market_cap_sol
                .ok_or(FeedError::MissingField("marketCapSol"))?;
            Ok(Some(FeedEvent::CurveUpdated {
                mint,
                sol_in_curve: finite(sol, "vSolInBondingCurve")?,
                market_cap_sol: finite(market_cap, "marketCapSol")?,
            }))
        }
        _ => Ok(None),
    }
}

fn required(v: Option<String>, field: &'static str) -> Result<String, FeedError> {
    match v {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(FeedError::MissingField(field)),
    }
}

/// Absent numbers read as zero; present ones must be finite and non-negative.
fn number(v: Option<f64>, field: &'static str) -> Result<f64, FeedError> {
    v.map_or(Ok(0.0), |n| finite(n, field))
}

fn finite(n: f64, field: &'static str) -> Result<f64, FeedError> {
    if n.is_finite() && n >= 0.0 {
        Ok(n)
    } else {
        Err(FeedError::InvalidNumber {
            field,
            value: n.to_string(),
        })
    }
}
