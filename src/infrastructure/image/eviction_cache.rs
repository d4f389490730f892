//! Bounded in-memory cache for processed image renditions.
//!
//! Eviction is least-frequently-used with a least-recently-touched
//! tiebreak, swept down to 80% of the count and size ceilings so an
//! insert at the limit does not trigger a sweep on every subsequent
//! insert.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::infrastructure::config::CacheConfig;

/// One processed rendition held by the cache.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Processed payload as a data URI.
    data: String,
    /// Measured byte size of `data`.
    size_bytes: usize,
    /// Logical last-access time; strictly increasing per cache.
    touched_at: u64,
    /// Read count; starts at 1 on insert.
    hits: u64,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Running total of `size_bytes`; maintained incrementally, never
    /// recomputed by full scan outside a sweep.
    current_size: usize,
    /// Logical clock, bumped on every insert and read.
    clock: u64,
}

/// Bounded key-to-rendition store with size- and count-based eviction.
///
/// Explicitly constructed and dependency-injected: the composition root
/// owns one instance for the process, and tests construct their own
/// isolated instances. Thread-safe; each call is atomic.
pub struct ProcessedImageCache {
    inner: RwLock<CacheInner>,
    config: CacheConfig,
    lookups_hit: AtomicU64,
    lookups_missed: AtomicU64,
}

impl ProcessedImageCache {
    /// Creates a cache with the given limits.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: RwLock::new(CacheInner::default()),
            config,
            lookups_hit: AtomicU64::new(0),
            lookups_missed: AtomicU64::new(0),
        }
    }

    /// Creates a cache with the default limits.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Stores the processed rendition for a raw payload.
    ///
    /// Payloads over the per-item ceiling are silently not cached: the
    /// image still displays, it is just reprocessed on its next view.
    /// Replacing an entry first retires its old size from the running
    /// total. Inserting may trigger an eviction sweep.
    pub async fn set(&self, raw: &str, processed: impl Into<String>) {
        let processed = processed.into();
        let size_bytes = processed.len();

        if size_bytes > self.config.max_item_bytes {
            debug!(size_bytes, "Processed image exceeds per-item ceiling, not caching");
            return;
        }

        let key = self.derive_key(raw);
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        if let Some(previous) = inner.entries.get(&key) {
            inner.current_size -= previous.size_bytes;
        }

        inner.clock += 1;
        let entry = CacheEntry {
            data: processed,
            size_bytes,
            touched_at: inner.clock,
            hits: 1,
        };
        inner.entries.insert(key.clone(), entry);
        inner.current_size += size_bytes;
        trace!(key = %key, size_bytes, "Stored processed image");

        self.sweep(inner);
    }

    /// Looks up the rendition for a raw payload.
    ///
    /// A hit bumps the entry's hit count and refreshes its access time;
    /// a miss is a normal outcome, never an error.
    pub async fn get(&self, raw: &str) -> Option<String> {
        let key = self.derive_key(raw);
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        inner.clock += 1;
        let now = inner.clock;

        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.hits += 1;
            entry.touched_at = now;
            self.lookups_hit.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Cache hit");
            Some(entry.data.clone())
        } else {
            self.lookups_missed.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Cache miss");
            None
        }
    }

    /// Existence check that leaves access metadata untouched.
    pub async fn has(&self, raw: &str) -> bool {
        let key = self.derive_key(raw);
        let inner = self.inner.read().await;
        inner.entries.contains_key(&key)
    }

    /// Empties the store and resets the running total.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.current_size = 0;
        debug!("Cleared processed image cache");
    }

    /// Returns cache statistics. Diagnostics only, never load-bearing.
    #[allow(clippy::cast_precision_loss)]
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        let entries = inner.entries.len();
        let total_hits: u64 = inner.entries.values().map(|e| e.hits).sum();

        CacheStats {
            entries,
            size_mb: inner.current_size as f64 / (1024.0 * 1024.0),
            hit_rate: total_hits as f64 / entries.max(1) as f64,
            lookups_hit: self.lookups_hit.load(Ordering::Relaxed),
            lookups_missed: self.lookups_missed.load(Ordering::Relaxed),
        }
    }

    /// Current entry count.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Derives the cache key for a raw payload.
    ///
    /// Hashes a bounded prefix rather than the whole payload; two
    /// payloads sharing an identical header therefore collide in theory.
    /// That approximation is deliberate (large payloads make full
    /// hashing costly) and `hash_full_payload` opts out of it.
    fn derive_key(&self, raw: &str) -> String {
        let bytes = raw.as_bytes();
        let prefix = if self.config.hash_full_payload {
            bytes
        } else {
            &bytes[..bytes.len().min(self.config.key_prefix_len)]
        };

        let digest = Sha256::digest(prefix);
        format!("img_{}", hex::encode(&digest[..16]))
    }

    /// Eviction sweep: runs after every insert, but only acts once the
    /// entry count or running size exceeds its ceiling. Entries leave in
    /// ascending `(hits, touched_at)` order until both dimensions fall
    /// to the sweep target.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn sweep(&self, inner: &mut CacheInner) {
        if inner.entries.len() <= self.config.max_entries
            && inner.current_size <= self.config.max_size_bytes
        {
            return;
        }

        let entry_floor = (self.config.max_entries as f64 * self.config.sweep_target_ratio) as usize;
        let size_floor =
            (self.config.max_size_bytes as f64 * self.config.sweep_target_ratio) as usize;

        let mut victims: Vec<(String, u64, u64, usize)> = inner
            .entries
            .iter()
            .map(|(key, e)| (key.clone(), e.hits, e.touched_at, e.size_bytes))
            .collect();
        victims.sort_by_key(|&(_, hits, touched_at, _)| (hits, touched_at));

        let mut removed = 0usize;
        let mut removed_bytes = 0usize;
        for (key, _, _, size_bytes) in victims {
            if inner.entries.len() <= entry_floor && inner.current_size <= size_floor {
                break;
            }
            inner.entries.remove(&key);
            inner.current_size -= size_bytes;
            removed += 1;
            removed_bytes += size_bytes;
        }

        debug!(
            removed,
            removed_mb = removed_bytes as f64 / (1024.0 * 1024.0),
            "Cache sweep complete"
        );
    }
}

impl std::fmt::Debug for ProcessedImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessedImageCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Statistics about cache occupancy and performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Current number of cached renditions.
    pub entries: usize,
    /// Running total size in MiB.
    pub size_mb: f64,
    /// Mean hits per resident entry.
    pub hit_rate: f64,
    /// Lifetime lookup hits.
    pub lookups_hit: u64,
    /// Lifetime lookup misses.
    pub lookups_missed: u64,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {:.2}MB, {:.1} mean hits ({} hits, {} misses)",
            self.entries, self.size_mb, self.hit_rate, self.lookups_hit, self.lookups_missed
        )
    }
}
