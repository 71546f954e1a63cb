//! Cache of model extraction results keyed by message text.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::key::{key_words, normalize_key, variations};
use super::ttl_cache::{Removal, TtlCache};
use crate::domain::trip::ParsedIntent;

/// Default entry lifetime (1 hour).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_MAX_ENTRIES: usize = 1000;
/// Share of the incoming message's words a cached key must contain.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.7;
pub const DEFAULT_FUZZY_MIN_OVERLAP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub max_entries: usize,
    pub fuzzy_threshold: f64,
    pub fuzzy_min_overlap: usize,
    pub store_variations: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            fuzzy_min_overlap: DEFAULT_FUZZY_MIN_OVERLAP,
            store_variations: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub exact_hits: u64,
    pub fuzzy_hits: u64,
    pub misses: u64,
    /// Entries pushed out by the capacity bound.
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed.
    pub expirations: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit {
    pub intent: ParsedIntent,
    pub kind: HitKind,
    /// Key that produced the hit.
    pub key: String,
}

#[derive(Debug)]
struct Inner {
    entries: TtlCache<ParsedIntent>,
    stats: CacheStats,
}

impl Inner {
    fn record(&mut self, removal: Option<Removal>) {
        match removal {
            Some(Removal::Expired) => self.stats.expirations += 1,
            Some(Removal::Evicted) => self.stats.evictions += 1,
            None => {}
        }
    }
}

/// Thread-safe intent cache owned by the pipeline.
#[derive(Debug)]
pub struct IntentCache {
    settings: CacheSettings,
    inner: Mutex<Inner>,
}

impl Default for IntentCache {
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}

impl IntentCache {
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: TtlCache::new(settings.ttl, settings.max_entries),
                stats: CacheStats::default(),
            }),
            settings,
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Exact lookup by key. Expired entries are dropped on read.
    pub fn get(&self, key: &str) -> Option<ParsedIntent> {
        self.get_at(key, Instant::now())
    }

    pub fn set(&self, key: &str, intent: ParsedIntent) {
        self.set_at(key, intent, Instant::now());
    }

    pub fn has(&self, key: &str) -> bool {
        self.has_at(key, Instant::now())
    }

    /// Exact match on the message or one of its variations, then a fuzzy
    /// word-overlap match against every live key.
    pub fn lookup(&self, message: &str) -> Option<CacheHit> {
        self.lookup_at(message, Instant::now())
    }

    /// Stores `intent` under the message key and, if enabled, its variations.
    pub fn store(&self, message: &str, intent: &ParsedIntent) {
        self.store_at(message, intent, Instant::now());
    }

    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<ParsedIntent> {
        let mut inner = self.lock();
        let (value, removal) = inner.entries.get_at(&normalize_key(key), now);
        inner.record(removal);
        if value.is_some() {
            inner.stats.exact_hits += 1;
        } else {
            inner.stats.misses += 1;
        }
        value
    }

    pub(crate) fn has_at(&self, key: &str, now: Instant) -> bool {
        let mut inner = self.lock();
        let (value, removal) = inner.entries.get_at(&normalize_key(key), now);
        inner.record(removal);
        value.is_some()
    }

    pub(crate) fn set_at(&self, key: &str, intent: ParsedIntent, now: Instant) {
        let mut inner = self.lock();
        let evicted = inner.entries.insert_at(normalize_key(key), intent, now);
        inner.stats.evictions += evicted as u64;
    }

    pub(crate) fn store_at(&self, message: &str, intent: &ParsedIntent, now: Instant) {
        let key = normalize_key(message);
        if key.is_empty() {
            return;
        }
        let mut keys = vec![key.clone()];
        if self.settings.store_variations {
            keys.extend(variations(&key));
        }
        let mut inner = self.lock();
        for k in keys {
            let evicted = inner.entries.insert_at(k, intent.clone(), now);
            inner.stats.evictions += evicted as u64;
        }
        tracing::debug!(target: "trip_intent::cache", key = %key, "intent cached");
    }

    pub(crate) fn lookup_at(&self, message: &str, now: Instant) -> Option<CacheHit> {
        let key = normalize_key(message);
        if key.is_empty() {
            return None;
        }
        let mut inner = self.lock();

        let mut candidates = vec![key.clone()];
        candidates.extend(variations(&key));
        for candidate in candidates {
            let (value, removal) = inner.entries.get_at(&candidate, now);
            inner.record(removal);
            if let Some(intent) = value {
                inner.stats.exact_hits += 1;
                tracing::debug!(target: "trip_intent::cache", key = %candidate, "exact cache hit");
                return Some(CacheHit {
                    intent,
                    kind: HitKind::Exact,
                    key: candidate,
                });
            }
        }

        let hit = self.best_fuzzy_match(&inner.entries, &key, now);
        match &hit {
            Some(found) => {
                inner.stats.fuzzy_hits += 1;
                tracing::debug!(
                    target: "trip_intent::cache",
                    message = %key,
                    matched = %found.key,
                    "fuzzy cache hit"
                );
            }
            None => inner.stats.misses += 1,
        }
        hit
    }

    /// Cached key sharing the most words with `key`, if the overlap clears
    /// both the threshold and the minimum. Every number in the message must
    /// also appear in the cached key.
    fn best_fuzzy_match(
        &self,
        entries: &TtlCache<ParsedIntent>,
        key: &str,
        now: Instant,
    ) -> Option<CacheHit> {
        let words = key_words(key);
        let required = ((words.len() as f64) * self.settings.fuzzy_threshold).ceil() as usize;
        let required = required.max(self.settings.fuzzy_min_overlap);
        if words.len() < required {
            return None;
        }
        let numbers: Vec<&String> = words
            .iter()
            .filter(|w| w.chars().any(|c| c.is_ascii_digit()))
            .collect();

        entries
            .live_entries_at(now)
            .filter_map(|(cached_key, intent)| {
                let cached_words = key_words(cached_key);
                if !numbers.iter().all(|n| cached_words.contains(n)) {
                    return None;
                }
                let overlap = words.iter().filter(|w| cached_words.contains(w)).count();
                (overlap >= required).then_some((overlap, cached_key, intent))
            })
            // First (oldest) key wins ties.
            .fold(None, |best: Option<(usize, &str, &ParsedIntent)>, candidate| {
                match best {
                    Some(b) if b.0 >= candidate.0 => Some(b),
                    _ => Some(candidate),
                }
            })
            .map(|(_, cached_key, intent)| CacheHit {
                intent: intent.clone(),
                kind: HitKind::Fuzzy,
                key: cached_key.to_string(),
            })
    }

    pub(crate) fn purge_expired_at(&self, now: Instant) -> usize {
        let mut inner = self.lock();
        let purged = inner.entries.purge_expired_at(now);
        inner.stats.expirations += purged as u64;
        purged
    }
}
