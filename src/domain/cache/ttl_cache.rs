//! Bounded map with per-entry TTL and insertion-order eviction.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Expired,
    Evicted,
}

/// Not synchronized; callers wrap it in a lock.
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    entries: HashMap<String, Entry<V>>,
    /// Keys oldest first.
    order: VecDeque<String>,
    ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the live value for `key`, dropping it first if it has expired.
    pub fn get_at(&mut self, key: &str, now: Instant) -> (Option<V>, Option<Removal>) {
        let live = match self.entries.get(key) {
            Some(entry) => self.is_live(entry, now).then(|| entry.value.clone()),
            None => return (None, None),
        };
        match live {
            Some(value) => (Some(value), None),
            None => {
                self.remove(key);
                (None, Some(Removal::Expired))
            }
        }
    }

    /// Inserts `value`, evicting the oldest entries while at capacity.
    ///
    /// Overwriting a key counts as a fresh insertion.
    ///
    /// # Returns
    /// The number of entries evicted to make room
    pub fn insert_at(&mut self, key: String, value: V, now: Instant) -> usize {
        if self.entries.contains_key(&key) {
            self.remove(&key);
        }
        let mut evicted = 0;
        while self.entries.len() >= self.max_entries {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                    evicted += 1;
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: now,
            },
        );
        evicted
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        let entry = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(entry.value)
    }

    /// Drops every expired entry.
    ///
    /// # Returns
    /// The number of entries removed
    pub fn purge_expired_at(&mut self, now: Instant) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.inserted_at) < ttl);
        let entries = &self.entries;
        self.order.retain(|k| entries.contains_key(k));
        before - self.entries.len()
    }

    /// Live entries, oldest first.
    pub fn live_entries_at(&self, now: Instant) -> impl Iterator<Item = (&str, &V)> {
        self.order.iter().filter_map(move |key| {
            self.entries
                .get(key)
                .filter(|entry| self.is_live(entry, now))
                .map(|entry| (key.as_str(), &entry.value))
        })
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn is_live(&self, entry: &Entry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) < self.ttl
    }
}
