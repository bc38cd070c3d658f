//! Tracked set: the bounded mint → [`AssetRecord`] map.
//!
//! Guarantees:
//! - A mint appears at most once.
//! - Discovery never grows the set past `max_coins_to_track`; at capacity it
//!   evicts exactly one unpinned entry (oldest `added_at`, FIFO) or refuses.
//! - Pinned entries are never evicted. Track requests may push the set past
//!   capacity when every entry is pinned.

use std::collections::{BTreeSet, HashMap};

use corelib::{TradeEvent, TradeObservation, TradeRejection};
use tracing::{debug, info, instrument, warn};

use crate::asset::{AssetRecord, AssetSeed, SignalChange};
use crate::config::ScannerConfig;

/// Result of a discovery or track request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Admission {
    Inserted,
    InsertedAfterEvicting(String),
    AlreadyPresent,
    /// Set full and every entry pinned.
    Refused,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TradeOutcome {
    Appended,
    UnknownMint,
    Rejected(TradeRejection),
    /// Opening balance on a mint not watched since creation; kept as a
    /// baseline only.
    Baseline,
}

#[derive(Debug, Default)]
pub struct TrackedSet {
    entries: HashMap<String, AssetRecord>,
    next_seq: u64,
}

impl TrackedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, mint: &str) -> Option<&AssetRecord> {
        self.entries.get(mint)
    }

    pub fn contains(&self, mint: &str) -> bool {
        self.entries.contains_key(mint)
    }

    pub fn records(&self) -> impl Iterator<Item = &AssetRecord> {
        self.entries.values()
    }

    pub fn mints(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }

    /// Admits a discovered asset if there is room (possibly after one eviction).
    #[instrument(skip(self, seed), fields(mint = %seed.mint), level = "debug")]
    pub fn on_discovered(&mut self, seed: AssetSeed, now_ms: u64, capacity: usize) -> Admission {
        if self.entries.contains_key(&seed.mint) {
            return Admission::AlreadyPresent;
        }

        let mut evicted = None;
        if self.entries.len() >= capacity {
            match self.evict_one() {
                Some(victim) => evicted = Some(victim),
                None => {
                    debug!(size = self.entries.len(), "tracked set saturated with pinned entries; discovery dropped");
                    return Admission::Refused;
                }
            }
        }

        self.insert(seed, now_ms).watched_since_creation = true;
        match evicted {
            Some(victim) => Admission::InsertedAfterEvicting(victim),
            None => Admission::Inserted,
        }
    }

    /// Force-admits `mint` (or upgrades an existing entry) as tracked and pinned.
    #[instrument(skip(self), level = "debug")]
    pub fn on_track_requested(&mut self, mint: &str, now_ms: u64, capacity: usize) -> Admission {
        if let Some(existing) = self.entries.get_mut(mint) {
            existing.is_tracked = true;
            existing.is_pinned = true;
            return Admission::AlreadyPresent;
        }

        let evicted = if self.entries.len() >= capacity {
            self.evict_one()
        } else {
            None
        };

        let record = self.insert(AssetSeed::unnamed(mint), now_ms);
        record.is_tracked = true;
        record.is_pinned = true;

        if self.entries.len() > capacity {
            info!(size = self.entries.len(), capacity, "tracked set above capacity (pinned entries)");
        }

        match evicted {
            Some(victim) => Admission::InsertedAfterEvicting(victim),
            None => Admission::Inserted,
        }
    }

    pub fn on_trade_event(&mut self, mint: &str, obs: TradeObservation) -> TradeOutcome {
        let Some(record) = self.entries.get_mut(mint) else {
            return TradeOutcome::UnknownMint;
        };

        match TradeEvent::try_from(obs) {
            Ok(event) => {
                record.append(event);
                TradeOutcome::Appended
            }
            Err(reason) => {
                warn!(mint, %reason, "trade rejected");
                TradeOutcome::Rejected(reason)
            }
        }
    }

    /// A holder's first balance. Counts as a buy only when the mint was
    /// discovered at creation; otherwise the holder may be selling out of a
    /// position we never saw open.
    pub fn on_opening_balance(&mut self, mint: &str, obs: TradeObservation) -> TradeOutcome {
        match self.entries.get(mint) {
            None => TradeOutcome::UnknownMint,
            Some(record) if !record.watched_since_creation => {
                debug!(mint, amount = obs.amount, "opening balance taken as baseline");
                TradeOutcome::Baseline
            }
            Some(_) => self.on_trade_event(mint, obs),
        }
    }

    /// Applies a bonding-curve update. Returns `false` for unknown mints.
    pub fn on_curve_update(&mut self, mint: &str, liquidity: f64, market_cap: f64) -> bool {
        let Some(record) = self.entries.get_mut(mint) else {
            return false;
        };
        if liquidity.is_finite() && liquidity >= 0.0 {
            record.liquidity = liquidity;
        }
        if market_cap.is_finite() && market_cap >= 0.0 {
            record.market_cap = market_cap;
        }
        true
    }

    /// Migrated assets leave the scalping universe entirely.
    pub fn on_migration_exit(&mut self, mint: &str) -> Option<AssetRecord> {
        let mut record = self.entries.remove(mint)?;
        record.pre_migration = false;
        info!(mint, pinned = record.is_pinned, "asset migrated; removed from tracked set");
        Some(record)
    }

    /// Flips `is_pinned`. `None` when the mint is absent.
    pub fn toggle_pin(&mut self, mint: &str) -> Option<bool> {
        let record = self.entries.get_mut(mint)?;
        record.is_pinned = !record.is_pinned;
        Some(record.is_pinned)
    }

    /// Flips `is_tracked`. `None` when the mint is absent.
    pub fn toggle_track(&mut self, mint: &str) -> Option<bool> {
        let record = self.entries.get_mut(mint)?;
        record.is_tracked = !record.is_tracked;
        Some(record.is_tracked)
    }

    /// Evicts unpinned entries (FIFO) until the set fits `capacity` or only
    /// pinned entries remain. Returns the evicted mints.
    pub fn enforce_capacity(&mut self, capacity: usize) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.entries.len() > capacity {
            match self.evict_one() {
                Some(victim) => evicted.push(victim),
                None => break,
            }
        }
        evicted
    }

    /// Refreshes every record for `now_ms` under one config snapshot.
    pub fn refresh_all(&mut self, now_ms: u64, cfg: &ScannerConfig) -> Vec<(String, SignalChange)> {
        self.entries
            .iter_mut()
            .map(|(mint, record)| (mint.clone(), record.refresh(now_ms, cfg)))
            .collect()
    }

    fn insert(&mut self, seed: AssetSeed, now_ms: u64) -> &mut AssetRecord {
        let seq = self.next_seq;
        self.next_seq += 1;
        let mint = seed.mint.clone();
        debug!(mint = %mint, size = self.entries.len() + 1, "asset admitted");
        self.entries
            .entry(mint)
            .or_insert_with(|| AssetRecord::new(seed, now_ms, seq))
    }

    fn evict_one(&mut self) -> Option<String> {
        let victim = pick_victim(&self.entries)?;
        self.entries.remove(&victim);
        info!(
            evicted = %victim,
            size = self.entries.len(),
            "capacity reached; evicted oldest unpinned asset"
        );
        Some(victim)
    }
}

/// Oldest unpinned entry by `added_at`, then by admission order.
fn pick_victim(entries: &HashMap<String, AssetRecord>) -> Option<String> {
    entries
        .values()
        .filter(|r| !r.is_pinned)
        .min_by_key(|r| (r.added_at_ms, r.seq))
        .map(|r| r.mint.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::Direction;

    fn seed(mint: &str) -> AssetSeed {
        AssetSeed {
            mint: mint.into(),
            name: mint.into(),
            symbol: mint.into(),
            liquidity: 10.0,
            market_cap: 30.0,
            price: 0.0,
        }
    }

    fn obs(ts_ms: Option<u64>) -> TradeObservation {
        TradeObservation {
            ts_ms,
            amount: 1.0,
            direction: Direction::Buy,
        }
    }

    #[test]
    fn opening_balance_counts_only_for_discovered_mints() {
        let mut set = TrackedSet::new();
        set.on_discovered(seed("Fresh"), 1, 5);
        set.on_track_requested("Requested", 1, 5);

        assert_eq!(set.on_opening_balance("Fresh", obs(Some(2))), TradeOutcome::Appended);
        assert_eq!(set.on_opening_balance("Requested", obs(Some(2))), TradeOutcome::Baseline);
        assert_eq!(set.on_opening_balance("Nope", obs(Some(2))), TradeOutcome::UnknownMint);

        assert_eq!(set.get("Fresh").unwrap().window().len(), 1);
        assert!(set.get("Requested").unwrap().window().is_empty());
    }

    #[test]
    fn track_request_keeps_discovery_origin() {
        let mut set = TrackedSet::new();
        set.on_discovered(seed("A"), 1, 5);
        set.on_track_requested("A", 2, 5);

        assert!(set.get("A").unwrap().watched_since_creation);
    }

    #[test]
    fn discovery_evicts_oldest_unpinned_first() {
        let mut set = TrackedSet::new();
        assert_eq!(set.on_discovered(seed("A"), 1, 2), Admission::Inserted);
        assert_eq!(set.on_discovered(seed("B"), 2, 2), Admission::Inserted);

        let outcome = set.on_discovered(seed("C"), 3, 2);

        assert_eq!(outcome, Admission::InsertedAfterEvicting("A".into()));
        assert!(!set.contains("A"));
        assert!(set.contains("B"));
        assert!(set.contains("C"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn pinned_entry_survives_even_when_oldest() {
        let mut set = TrackedSet::new();
        set.on_discovered(seed("A"), 1, 2);
        set.on_discovered(seed("B"), 2, 2);
        assert_eq!(set.toggle_pin("A"), Some(true));

        set.on_discovered(seed("C"), 3, 2);
        set.on_discovered(seed("D"), 4, 2);

        assert!(set.contains("A"));
        assert!(!set.contains("B"));
        assert!(!set.contains("C"));
        assert!(set.contains("D"));
    }

    #[test]
    fn discovery_refused_when_every_entry_is_pinned() {
        let mut set = TrackedSet::new();
        set.on_track_requested("A", 1, 1);

        assert_eq!(set.on_discovered(seed("B"), 2, 1), Admission::Refused);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn same_millisecond_ties_follow_admission_order() {
        let mut set = TrackedSet::new();
        set.on_discovered(seed("X"), 7, 2);
        set.on_discovered(seed("Y"), 7, 2);

        assert_eq!(
            set.on_discovered(seed("Z"), 7, 2),
            Admission::InsertedAfterEvicting("X".into())
        );
    }

    #[test]
    fn rediscovery_is_a_no_op() {
        let mut set = TrackedSet::new();
        set.on_discovered(seed("A"), 1, 5);
        let mut again = seed("A");
        again.name = "Renamed".into();

        assert_eq!(set.on_discovered(again, 9, 5), Admission::AlreadyPresent);
        assert_eq!(set.get("A").map(|r| r.name.as_str()), Some("A"));
        assert_eq!(set.get("A").map(|r| r.added_at_ms), Some(1));
    }

    #[test]
    fn track_request_pins_and_may_exceed_capacity() {
        let mut set = TrackedSet::new();
        set.on_track_requested("A", 1, 1);
        let outcome = set.on_track_requested("B", 2, 1);

        assert_eq!(outcome, Admission::Inserted);
        assert_eq!(set.len(), 2);
        let b = set.get("B").unwrap();
        assert!(b.is_pinned && b.is_tracked);
    }

    #[test]
    fn track_request_at_capacity_evicts_unpinned() {
        let mut set = TrackedSet::new();
        set.on_discovered(seed("A"), 1, 1);

        assert_eq!(
            set.on_track_requested("B", 2, 1),
            Admission::InsertedAfterEvicting("A".into())
        );
    }

    #[test]
    fn track_request_upgrades_existing_entry() {
        let mut set = TrackedSet::new();
        set.on_discovered(seed("A"), 1, 3);

        assert_eq!(set.on_track_requested("A", 5, 3), Admission::AlreadyPresent);
        let a = set.get("A").unwrap();
        assert!(a.is_pinned && a.is_tracked);
        assert_eq!(a.name, "A");
    }

    #[test]
    fn trades_for_unknown_mints_are_ignored() {
        let mut set = TrackedSet::new();
        assert_eq!(set.on_trade_event("nope", obs(Some(1))), TradeOutcome::UnknownMint);
    }

    #[test]
    fn trade_without_timestamp_is_not_inserted() {
        let mut set = TrackedSet::new();
        set.on_discovered(seed("A"), 1, 3);

        assert_eq!(
            set.on_trade_event("A", obs(None)),
            TradeOutcome::Rejected(TradeRejection::MissingTimestamp)
        );
        assert_eq!(set.on_trade_event("A", obs(Some(5))), TradeOutcome::Appended);
        assert_eq!(set.get("A").unwrap().window().len(), 1);
    }

    #[test]
    fn migration_removes_even_pinned_assets() {
        let mut set = TrackedSet::new();
        set.on_track_requested("A", 1, 3);

        let removed = set.on_migration_exit("A").unwrap();
        assert!(!removed.pre_migration);
        assert!(set.is_empty());
        assert!(set.on_migration_exit("A").is_none());
    }

    #[test]
    fn toggles_are_no_ops_for_absent_mints() {
        let mut set = TrackedSet::new();
        assert_eq!(set.toggle_pin("ghost"), None);
        assert_eq!(set.toggle_track("ghost"), None);

        set.on_discovered(seed("A"), 1, 3);
        assert_eq!(set.toggle_track("A"), Some(true));
        assert_eq!(set.toggle_track("A"), Some(false));
    }

    #[test]
    fn enforce_capacity_trims_unpinned_fifo() {
        let mut set = TrackedSet::new();
        for (i, m) in ["A", "B", "C", "D"].iter().enumerate() {
            set.on_discovered(seed(m), i as u64, 10);
        }
        set.toggle_pin("A");

        let evicted = set.enforce_capacity(2);

        assert_eq!(evicted, vec!["B".to_string(), "C".to_string()]);
        assert_eq!(set.mints(), BTreeSet::from(["A".to_string(), "D".to_string()]));
    }

    #[test]
    fn curve_update_ignores_garbage_values() {
        let mut set = TrackedSet::new();
        set.on_discovered(seed("A"), 1, 3);

        assert!(set.on_curve_update("A", f64::NAN, 55.0));
        let a = set.get("A").unwrap();
        assert_eq!(a.liquidity, 10.0);
        assert_eq!(a.market_cap, 55.0);
        assert!(!set.on_curve_update("B", 1.0, 1.0));
    }
}
