//! Intent cache configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigValidationError;
use crate::domain::cache::{
    CacheSettings, DEFAULT_CACHE_TTL, DEFAULT_FUZZY_MIN_OVERLAP, DEFAULT_FUZZY_THRESHOLD,
    DEFAULT_MAX_ENTRIES,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime in seconds
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Share of message words a cached key must contain for a fuzzy hit
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    #[serde(default = "default_fuzzy_min_overlap")]
    pub fuzzy_min_overlap: usize,

    /// Also store filler-stripped and duration-normalized restatements
    #[serde(default = "default_store_variations")]
    pub store_variations: bool,
}

impl CacheConfig {
    pub fn settings(&self) -> CacheSettings {
        CacheSettings {
            ttl: Duration::from_secs(self.ttl_secs),
            max_entries: self.max_entries,
            fuzzy_threshold: self.fuzzy_threshold,
            fuzzy_min_overlap: self.fuzzy_min_overlap,
            store_variations: self.store_variations,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.ttl_secs == 0 {
            return Err(ConfigValidationError::MustBePositive("cache.ttl_secs"));
        }
        if self.max_entries == 0 {
            return Err(ConfigValidationError::MustBePositive("cache.max_entries"));
        }
        if !(self.fuzzy_threshold > 0.0 && self.fuzzy_threshold <= 1.0) {
            return Err(ConfigValidationError::InvalidFuzzyThreshold);
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_entries: default_max_entries(),
            fuzzy_threshold: default_fuzzy_threshold(),
            fuzzy_min_overlap: default_fuzzy_min_overlap(),
            store_variations: default_store_variations(),
        }
    }
}

fn default_ttl() -> u64 {
    DEFAULT_CACHE_TTL.as_secs()
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_fuzzy_threshold() -> f64 {
    DEFAULT_FUZZY_THRESHOLD
}

fn default_fuzzy_min_overlap() -> usize {
    DEFAULT_FUZZY_MIN_OVERLAP
}

fn default_store_variations() -> bool {
    true
}
