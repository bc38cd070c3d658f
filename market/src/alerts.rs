//! Debounced signal-transition alerts.
//!
//! One cooldown slot per (mint, kind). An alert fires when a record's signal
//! transitions into BUY or SELL and the slot's last firing is at least
//! [`ALERT_COOLDOWN_MS`] old. Alerts stay visible for [`ALERT_LIFETIME_MS`].

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::asset::SignalChange;
use crate::signal::Signal;

pub const ALERT_COOLDOWN_MS: u64 = 60_000;
pub const ALERT_LIFETIME_MS: u64 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertKind {
    Buy,
    Sell,
}

impl AlertKind {
    fn from_signal(signal: Signal) -> Option<Self> {
        match signal {
            Signal::Buy => Some(AlertKind::Buy),
            Signal::Sell => Some(AlertKind::Sell),
            Signal::Hold => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Alert {
    pub id: Uuid,
    pub kind: AlertKind,
    pub mint: String,
    pub message: String,
    pub created_at_ms: u64,
}

#[derive(Debug, Default)]
pub struct AlertBook {
    last_fired: HashMap<(String, AlertKind), u64>,
    active: Vec<Alert>,
}

impl AlertBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the alert fired for this change, if any.
    pub fn observe(
        &mut self,
        mint: &str,
        label: &str,
        change: SignalChange,
        now_ms: u64,
    ) -> Option<Alert> {
        if change.previous == change.current {
            return None;
        }
        let kind = AlertKind::from_signal(change.current)?;

        let key = (mint.to_string(), kind);
        if let Some(&last) = self.last_fired.get(&key) {
            if now_ms.saturating_sub(last) < ALERT_COOLDOWN_MS {
                return None;
            }
        }
        self.last_fired.insert(key, now_ms);

        let alert = Alert {
            id: Uuid::new_v4(),
            kind,
            mint: mint.to_string(),
            message: format!("{label}: {} signal", change.current),
            created_at_ms: now_ms,
        };
        self.active.push(alert.clone());
        Some(alert)
    }

    /// Drops alerts older than the display lifetime.
    pub fn expire(&mut self, now_ms: u64) {
        self.active
            .retain(|a| now_ms.saturating_sub(a.created_at_ms) < ALERT_LIFETIME_MS);
    }

    /// Forgets cooldown state and visible alerts for a mint that left the set.
    pub fn forget(&mut self, mint: &str) {
        self.last_fired.retain(|(m, _), _| m != mint);
        self.active.retain(|a| a.mint != mint);
    }

    pub fn active(&self) -> &[Alert] {
        &self.active
    }
}
