//! Intent cache.
//!
//! Model extraction results keyed by normalized message text, with lazy TTL
//! expiry, insertion-order eviction and word-overlap fuzzy matching.

mod intent_cache;
mod key;
mod ttl_cache;

pub use intent_cache::{
    CacheHit, CacheSettings, CacheStats, HitKind, IntentCache, DEFAULT_CACHE_TTL,
    DEFAULT_FUZZY_MIN_OVERLAP, DEFAULT_FUZZY_THRESHOLD, DEFAULT_MAX_ENTRIES,
};
pub use key::{key_words, normalize_key, variations};
pub use ttl_cache::{Removal, TtlCache};
