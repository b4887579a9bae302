//! Tagged TTL cache shared across queries.
//!
//! Entries expire after their own TTL and can be dropped in bulk by tag
//! (`user_id_7`, `position_id_3`, ...). A zero TTL means "do not store".
//! Every insert sweeps expired entries, and a full cache evicts its oldest
//! entry, so distinct one-off keys cannot pile up.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Default)]
struct CacheStats {
    hit_count: AtomicUsize,
    miss_count: AtomicUsize,
    expired_count: AtomicUsize,
    invalidated_count: AtomicUsize,
    evicted_count: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStatsReport {
    pub items_count: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub expired_count: usize,
    pub invalidated_count: usize,
    pub evicted_count: usize,
}

struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    ttl: Duration,
    tags: Vec<String>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    max_entries: usize,
    stats: CacheStats,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// `max_entries` is clamped to at least one.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
            stats: CacheStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.stats.hit_count.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            Some(_) => {}
            None => {
                self.stats.miss_count.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        }

        entries.remove(key);
        self.stats.expired_count.fetch_add(1, Ordering::Relaxed);
        self.stats.miss_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Returns false when the TTL is zero and nothing was stored.
    pub fn insert(&self, key: K, value: V, ttl: Duration, tags: Vec<String>) -> bool {
        if ttl.is_zero() {
            return false;
        }

        let mut entries = self.lock();
        self.purge_expired(&mut entries);

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            self.evict_oldest(&mut entries);
        }

        let entry = CacheEntry {
            value,
            created_at: Instant::now(),
            ttl,
            tags,
        };
        entries.insert(key, entry);
        true
    }

    fn purge_expired(&self, entries: &mut HashMap<K, CacheEntry<V>>) {
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let removed = before - entries.len();

        if removed > 0 {
            self.stats.expired_count.fetch_add(removed, Ordering::Relaxed);
            tracing::debug!("Swept {} expired cache entries", removed);
        }
    }

    fn evict_oldest(&self, entries: &mut HashMap<K, CacheEntry<V>>) {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.created_at)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            entries.remove(&key);
            self.stats.evicted_count.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Cache full ({} entries), evicted the oldest", self.max_entries);
        }
    }

    pub fn invalidate_tag(&self, tag: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.iter().any(|t| t == tag));
        let removed = before - entries.len();

        self.stats
            .invalidated_count
            .fetch_add(removed, Ordering::Relaxed);
        removed
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStatsReport {
        CacheStatsReport {
            items_count: self.len(),
            hit_count: self.stats.hit_count.load(Ordering::Relaxed),
            miss_count: self.stats.miss_count.load(Ordering::Relaxed),
            expired_count: self.stats.expired_count.load(Ordering::Relaxed),
            invalidated_count: self.stats.invalidated_count.load(Ordering::Relaxed),
            evicted_count: self.stats.evicted_count.load(Ordering::Relaxed),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
