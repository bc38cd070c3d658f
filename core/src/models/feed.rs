use serde::{Deserialize, Serialize};

use super::trade::TradeObservation;

/// A newly created asset announced by the discovery feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinCreated {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    /// SOL held by the bonding curve; used as liquidity.
    pub sol_in_curve: f64,
    pub tokens_in_curve: f64,
    pub market_cap_sol: f64,
}

impl CoinCreated {
    pub fn price(&self) -> f64 {
        if self.tokens_in_curve > 0.0 {
            self.sol_in_curve / self.tokens_in_curve
        } else {
            0.0
        }
    }
}

/// Normalized event produced by a feed and consumed by the market manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedEvent {
    Created(CoinCreated),
    Migrated {
        mint: String,
    },
    CurveUpdated {
        mint: String,
        sol_in_curve: f64,
        market_cap_sol: f64,
    },
    Trade {
        mint: String,
        trade: TradeObservation,
    },
    /// First balance seen for a holder, expressed as a buy from zero. Only a
    /// real trade when the mint has been watched since creation.
    OpeningBalance {
        mint: String,
        trade: TradeObservation,
    },
}

impl FeedEvent {
    pub fn mint(&self) -> &str {
        match self {
            FeedEvent::Created(c) => &c.mint,
            FeedEvent::Migrated { mint }
            | FeedEvent::CurveUpdated { mint, .. }
            | FeedEvent::Trade { mint, .. }
            | FeedEvent::OpeningBalance { mint, .. } => mint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_guards_empty_curve() {
        let c = CoinCreated {
            mint: "m".into(),
            name: "n".into(),
            symbol: "s".into(),
            sol_in_curve: 30.0,
            tokens_in_curve: 0.0,
            market_cap_sol: 28.0,
        };
        assert_eq!(c.price(), 0.0);
    }
}
