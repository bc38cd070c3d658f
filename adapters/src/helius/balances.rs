//! Previous-balance cache that turns balance snapshots into trades.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use corelib::Direction;

pub const DEFAULT_BALANCE_CAPACITY: usize = 50_000;

type Key = (String, String);

/// What one balance snapshot implies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BalanceChange {
    /// Known holder whose balance moved.
    Trade(Direction, f64),
    /// Holder seen for the first time with a non-zero balance. A buy from
    /// zero if the mint was watched since creation, otherwise just a baseline.
    Opening(f64),
    /// Nothing to report.
    None,
}

/// Keyed by `(owner, mint)`. Oldest keys are dropped once `capacity` is
/// reached; a mint that lost keys that way only re-baselines new sightings.
#[derive(Debug)]
pub struct BalanceCache {
    balances: HashMap<Key, f64>,
    order: VecDeque<Key>,
    /// Mints with holder history dropped for capacity.
    lossy_mints: HashSet<String>,
    capacity: usize,
}

impl BalanceCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            balances: HashMap::new(),
            order: VecDeque::new(),
            lossy_mints: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn previous(&self, owner: &str, mint: &str) -> Option<f64> {
        self.balances
            .get(&(owner.to_string(), mint.to_string()))
            .copied()
    }

    /// Records `balance` and returns what it implies.
    pub fn observe(&mut self, owner: &str, mint: &str, balance: f64) -> BalanceChange {
        let key = (owner.to_string(), mint.to_string());
        let Some(prev) = self.balances.insert(key.clone(), balance) else {
            self.order.push_back(key);
            self.evict_overflow();
            if self.lossy_mints.contains(mint) || balance <= 0.0 {
                return BalanceChange::None;
            }
            return BalanceChange::Opening(balance);
        };

        let diff = balance - prev;
        if diff > 0.0 {
            BalanceChange::Trade(Direction::Buy, diff)
        } else if diff < 0.0 {
            BalanceChange::Trade(Direction::Sell, -diff)
        } else {
            BalanceChange::None
        }
    }

    /// Drops every entry whose mint is no longer watched.
    pub fn retain_mints(&mut self, watched: &BTreeSet<String>) {
        self.balances.retain(|(_, mint), _| watched.contains(mint));
        self.lossy_mints.retain(|mint| watched.contains(mint));
        let balances = &self.balances;
        self.order.retain(|k| balances.contains_key(k));
    }

    fn evict_overflow(&mut self) {
        while self.balances.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.balances.remove(&oldest);
            self.lossy_mints.insert(oldest.1);
        }
    }
}

impl Default for BalanceCache {
    fn default() -> Self {
        Self::new(DEFAULT_BALANCE_CAPACITY)
    }
}
