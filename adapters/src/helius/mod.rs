//! Helius: token-account balance changes, diffed into trade events.

pub mod balances;
pub mod parser;
pub mod types;

use std::collections::BTreeSet;

use corelib::{Direction, FeedEvent, TradeObservation};
use serde_json::json;
use tracing::{debug, trace};

use self::balances::{BalanceCache, BalanceChange};
use self::parser::parse_balance_update;
use self::types::{RpcRequest, TOKEN_PROGRAM_ID};
use crate::error::FeedError;
use crate::feed::Feed;

pub const DEFAULT_URL: &str = "wss://mainnet.helius-rpc.com";

/// Builds the websocket endpoint for an API key.
pub fn endpoint(base: &str, api_key: &str) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{}/{sep}api-key={api_key}", base.trim_end_matches('/'))
}

pub struct HeliusFeed {
    url: String,
    cache: BalanceCache,
}

impl HeliusFeed {
    pub fn new(url: impl Into<String>, cache_capacity: usize) -> Self {
        Self {
            url: url.into(),
            cache: BalanceCache::new(cache_capacity),
        }
    }

    pub fn cache(&self) -> &BalanceCache {
        &self.cache
    }
}

impl Feed for HeliusFeed {
    fn name(&self) -> &'static str {
        "helius"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn subscribe_frames(&mut self, watched: &BTreeSet<String>) -> Vec<String> {
        self.cache.retain_mints(watched);
        let req = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "programSubscribe",
            params: json!([
                TOKEN_PROGRAM_ID,
                { "commitment": "confirmed", "encoding": "jsonParsed" }
            ]),
        };
        serde_json::to_string(&req).into_iter().collect()
    }

    /// No frames: the program subscription already covers every mint. Only
    /// the cache is pruned.
    fn watch_frames(&mut self, watched: &BTreeSet<String>) -> Vec<String> {
        self.cache.retain_mints(watched);
        debug!(cached = self.cache.len(), "balance cache pruned to watched mints");
        Vec::new()
    }

    fn decode(
        &mut self,
        raw: &str,
        watched: &BTreeSet<String>,
        now_ms: u64,
    ) -> Result<Vec<FeedEvent>, FeedError> {
        let Some(update) = parse_balance_update(raw)? else {
            return Ok(Vec::new());
        };
        if !watched.contains(&update.mint) {
            trace!(mint = %update.mint, "balance change for untracked mint");
            return Ok(Vec::new());
        }

        let trade = |amount, direction| TradeObservation {
            // notifications carry no wall time; arrival stands in
            ts_ms: Some(now_ms),
            amount,
            direction,
        };
        let event = match self
            .cache
            .observe(&update.owner, &update.mint, update.balance)
        {
            BalanceChange::Trade(direction, amount) => FeedEvent::Trade {
                mint: update.mint,
                trade: trade(amount, direction),
            },
            BalanceChange::Opening(amount) => FeedEvent::OpeningBalance {
                mint: update.mint,
                trade: trade(amount, Direction::Buy),
            },
            BalanceChange::None => return Ok(Vec::new()),
        };
        Ok(vec![event])
    }
}
