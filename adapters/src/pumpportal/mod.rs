//! PumpPortal: discovery (create), migration and bonding-curve updates.

pub mod parser;
pub mod types;

use std::collections::BTreeSet;

use corelib::FeedEvent;
use tracing::debug;

use self::parser::parse_pump_message;
use self::types::SubscribeRequest;
use crate::error::FeedError;
use crate::feed::Feed;

pub const DEFAULT_URL: &str = "wss://pumpportal.fun/api/data";

pub struct PumpPortalFeed {
    url: String,
    /// Mints with an active trade subscription on the current connection.
    trade_keys: BTreeSet<String>,
}

impl PumpPortalFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            trade_keys: BTreeSet::new(),
        }
    }
}

fn frame(method: &str, keys: Option<Vec<&str>>) -> Option<String> {
    serde_json::to_string(&SubscribeRequest { method, keys }).ok()
}

fn keyed_frame<'a>(method: &str, keys: impl Iterator<Item = &'a String>) -> Option<String> {
    let keys: Vec<&str> = keys.map(String::as_str).collect();
    if keys.is_empty() {
        return None;
    }
    frame(method, Some(keys))
}

impl Feed for PumpPortalFeed {
    fn name(&self) -> &'static str {
        "pumpportal"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn subscribe_frames(&mut self, watched: &BTreeSet<String>) -> Vec<String> {
        self.trade_keys = watched.clone();
        [
            frame("subscribeNewToken", None),
            frame("subscribeMigration", None),
            keyed_frame("subscribeTokenTrade", self.trade_keys.iter()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn watch_frames(&mut self, watched: &BTreeSet<String>) -> Vec<String> {
        let added = keyed_frame("subscribeTokenTrade", watched.difference(&self.trade_keys));
        let removed = keyed_frame(
            "unsubscribeTokenTrade",
            self.trade_keys.difference(watched),
        );
        debug!(
            watched = watched.len(),
            subscribed = self.trade_keys.len(),
            "trade subscription delta"
        );
        self.trade_keys = watched.clone();
        [added, removed].into_iter().flatten().collect()
    }

    fn decode(
        &mut self,
        raw: &str,
        _watched: &BTreeSet<String>,
        _now_ms: u64,
    ) -> Result<Vec<FeedEvent>, FeedError> {
        Ok(parse_pump_message(raw)?.into_iter().collect())
    }
}
