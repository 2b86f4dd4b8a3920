//! Route resolution caching
//!
//! Optional LRU cache in front of the route table so repeated resolutions of
//! the same path (back/forward churn, re-renders asking for the current
//! route) skip the segment-wise scan.

use crate::{trace_log, RouteMatch};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache performance statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Resolutions answered from the cache
    pub hits: usize,
    /// Resolutions that fell through to the table
    pub misses: usize,
    /// Times the cache was cleared
    pub invalidations: usize,
}

impl CacheStats {
    /// Fraction of resolutions answered from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of path to resolution result
///
/// Caches misses as well as hits so unmatched paths don't rescan the table.
#[derive(Debug)]
pub struct RouteCache {
    entries: LruCache<String, Option<RouteMatch>>,
    stats: CacheStats,
}

impl RouteCache {
    const DEFAULT_CAPACITY: usize = 256;

    /// Create a cache with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a cache with a custom capacity
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).expect("Cache capacity must be non-zero");
        Self {
            entries: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    /// Look up a cached resolution for a path
    pub fn get(&mut self, path: &str) -> Option<Option<RouteMatch>> {
        match self.entries.get(path) {
            Some(cached) => {
                self.stats.hits += 1;
                Some(cached.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Record a resolution result for a path
    pub fn insert(&mut self, path: String, result: Option<RouteMatch>) {
        self.entries.put(path, result);
    }

    /// Drop all cached resolutions
    pub fn clear(&mut self) {
        trace_log!("Clearing route resolution cache");
        self.entries.clear();
        self.stats.invalidations += 1;
    }

    /// Number of cached paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new()
    }
}
