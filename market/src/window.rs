use std::collections::VecDeque;

use corelib::TradeEvent;

/// Longest horizon any metric looks back over.
pub const RETENTION_MS: u64 = 5 * 60 * 1_000;

/// Per-asset trade log, kept in arrival order and pruned by age.
///
/// Arrival order is not timestamp order: jittered events are stored as they
/// come, so every read path filters on the timestamp instead of the position.
#[derive(Clone, Debug, Default)]
pub struct WindowStore {
    events: VecDeque<TradeEvent>,
}

impl WindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: TradeEvent) {
        self.events.push_back(event);
    }

    /// Drops every event with `ts < now - RETENTION_MS`. Returns how many were dropped.
    pub fn prune(&mut self, now_ms: u64) -> usize {
        let cutoff = now_ms.saturating_sub(RETENTION_MS);
        let before = self.events.len();
        self.events.retain(|e| e.ts_ms() >= cutoff);
        before - self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TradeEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn latest(&self) -> Option<&TradeEvent> {
        self.events.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::Direction;
    use proptest::prelude::*;

    fn ev(ts_ms: u64, amount: f64) -> TradeEvent {
        TradeEvent::new(ts_ms, amount, Direction::Buy).unwrap()
    }

    #[test]
    fn append_keeps_arrival_order() {
        let mut w = WindowStore::new();
        w.append(ev(2_000, 1.0));
        w.append(ev(1_000, 2.0));

        let ts: Vec<u64> = w.iter().map(|e| e.ts_ms()).collect();
        assert_eq!(ts, vec![2_000, 1_000]);
        assert_eq!(w.latest().map(|e| e.ts_ms()), Some(1_000));
    }

    #[test]
    fn prune_drops_only_expired_events() {
        let now = 10 * RETENTION_MS;
        let mut w = WindowStore::new();
        w.append(ev(now - RETENTION_MS - 1, 1.0));
        w.append(ev(now - RETENTION_MS, 1.0));
        w.append(ev(now, 1.0));

        assert_eq!(w.prune(now), 1);
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn prune_removes_stale_entry_behind_fresh_one() {
        let now = 10 * RETENTION_MS;
        let mut w = WindowStore::new();
        w.append(ev(now - 1_000, 1.0));
        // Late arrival, already expired.
        w.append(ev(now - RETENTION_MS - 5_000, 1.0));

        w.prune(now);
        assert_eq!(w.len(), 1);
        assert_eq!(w.latest().map(|e| e.ts_ms()), Some(now - 1_000));
    }

    #[test]
    fn prune_near_epoch_does_not_underflow() {
        let mut w = WindowStore::new();
        w.append(ev(0, 1.0));
        assert_eq!(w.prune(1_000), 0);
        assert!(!w.is_empty());
    }

    proptest! {
        #[test]
        fn retained_events_are_within_retention(
            offsets in proptest::collection::vec(0u64..(3 * RETENTION_MS), 0..200),
            now_offset in 0u64..(3 * RETENTION_MS),
        ) {
            let base = 100 * RETENTION_MS;
            let now = base + now_offset;
            let mut w = WindowStore::new();
            for o in &offsets {
                w.append(ev(base + o, 1.0));
            }

            w.prune(now);

            for e in w.iter() {
                prop_assert!(now.saturating_sub(e.ts_ms()) <= RETENTION_MS);
            }
            let expected = offsets
                .iter()
                .filter(|o| base + **o >= now - RETENTION_MS)
                .count();
            prop_assert_eq!(w.len(), expected);
        }
    }
}
