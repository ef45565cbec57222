//! WeightedCache: thread-safe weighted LRU store

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::lru::WeightedLru;
use crate::sink::NoticeSink;
use crate::stats::CacheStats;

/// State guarded by the store-wide lock
struct Inner<V> {
    lru: WeightedLru<String, V>,
    sink: Option<Box<dyn NoticeSink>>,
    verbose: bool,
}

impl<V> Inner<V> {
    /// Evict until the budget holds, reporting each victim to the sink.
    ///
    /// Eviction always runs to completion. After the first failed notice no
    /// further notices are written, and that failure is returned.
    fn evict_for(&mut self, key: &str, weight: u64, stats: &CacheStats) -> Result<()> {
        let mut failure = None;

        while let Some(evicted) = self.lru.pop_lru_if_over_budget() {
            stats.record_eviction();
            let spare = self.lru.spare_weight();
            debug!(
                evicted = %evicted.key,
                evicted_weight = evicted.weight,
                key,
                weight,
                spare,
                "evicted entry"
            );

            if !self.verbose || failure.is_some() {
                continue;
            }

            if let Some(sink) = self.sink.as_mut() {
                let line = eviction_notice(&evicted.key, evicted.weight, key, weight, spare);
                if let Err(e) = sink.notice(&line) {
                    warn!(error = %e, key, "eviction notice failed");
                    failure = Some(e);
                }
            }
        }

        match failure {
            Some(e) => Err(Error::Notice(e)),
            None => Ok(()),
        }
    }
}

/// Format the line written to the sink for one eviction
pub fn eviction_notice(
    evicted: &str,
    evicted_weight: u64,
    key: &str,
    weight: u64,
    spare: i64,
) -> String {
    format!(
        "evicting {} ({}) for {} ({}); spare weight is now {}",
        evicted, evicted_weight, key, weight, spare
    )
}

/// In-memory store bounded by total entry weight, evicting least recently
/// used entries first.
///
/// Every operation takes one store-wide lock for its whole duration.
/// Retrieval reorders entries, so it is exclusive too.
pub struct WeightedCache<V> {
    inner: Mutex<Inner<V>>,
    stats: CacheStats,
}

impl<V> WeightedCache<V> {
    /// Create an empty cache with the given budget
    ///
    /// # Arguments
    /// * `budget` - Maximum total weight; zero or negative keeps a single entry
    pub fn new(budget: i64) -> Self {
        Self::with_config(CacheConfig::new(budget))
    }

    /// Create an empty cache from a [`CacheConfig`]
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                lru: WeightedLru::new(config.budget),
                sink: None,
                verbose: config.verbose,
            }),
            stats: CacheStats::new(),
        }
    }

    /// Insert a value under a new key
    ///
    /// # Arguments
    /// * `key` - Unique key; an existing key is rejected, never overwritten
    /// * `value` - Payload, owned by the cache until evicted or cleared
    /// * `weight` - Cost charged against the budget, fixed for the entry's life
    ///
    /// # Returns
    /// * `Err(Error::AlreadyExists)` - Key resident, nothing changed
    /// * `Err(Error::WeightOverflow)` - Running total would overflow, nothing changed
    /// * `Err(Error::Notice)` - Entry stored and eviction completed, but the sink failed
    pub fn insert(&self, key: impl Into<String>, value: V, weight: u64) -> Result<()> {
        let key = key.into();
        let mut inner = self.inner.lock();

        if let Err(e) = inner.lru.insert(key.clone(), value, weight) {
            self.stats.record_rejected();
            return Err(e);
        }
        self.stats.record_insert();

        inner.evict_for(&key, weight, &self.stats)
    }

    /// Get a copy of a value and mark it most recently used
    pub fn retrieve(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let mut inner = self.inner.lock();
        match inner.lru.get(key) {
            Some(value) => {
                self.stats.record_hit();
                Some(value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Drop every entry. No notices are emitted.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        let dropped = inner.lru.len();
        inner.lru.clear();
        debug!(dropped, "cleared cache");
    }

    /// Sum of resident weights
    pub fn weight(&self) -> u64 {
        self.inner.lock().lru.weight()
    }

    /// Configured budget
    pub fn budget(&self) -> i64 {
        self.inner.lock().lru.budget()
    }

    /// `budget - weight`; negative only while a single oversized entry is resident
    pub fn spare_weight(&self) -> i64 {
        self.inner.lock().lru.spare_weight()
    }

    /// Number of resident entries
    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.inner.lock().lru.is_empty()
    }

    /// Check residency without promoting the entry
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().lru.contains_key(key)
    }

    /// Snapshot of resident keys, most recently used first
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().lru.keys().cloned().collect()
    }

    /// Turn eviction notices on or off. Eviction itself is unaffected.
    pub fn set_verbose(&self, verbose: bool) {
        self.inner.lock().verbose = verbose;
    }

    /// Check if eviction notices are on
    pub fn is_verbose(&self) -> bool {
        self.inner.lock().verbose
    }

    /// Install the destination for eviction notices, replacing any previous one.
    ///
    /// The sink runs under the cache lock and must not call back into this cache.
    pub fn set_sink(&self, sink: impl NoticeSink + 'static) {
        self.inner.lock().sink = Some(Box::new(sink));
    }

    /// Remove and return the current sink
    pub fn take_sink(&self) -> Option<Box<dyn NoticeSink>> {
        self.inner.lock().sink.take()
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl<V> Default for WeightedCache<V> {
    fn default() -> Self {
        Self::with_config(CacheConfig::default())
    }
}
