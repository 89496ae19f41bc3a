//! In-memory resource cache with TTL expiry and LRU eviction
//!
//! One [`ResourceCache`] exists per resource type. All operations are
//! synchronous and hold the internal lock only for the duration of the map
//! access, so they are safe to call from foreground requests, auto-refresh
//! timers and the cleanup sweep alike.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use super::key::CacheKey;
use crate::client::{QueryParams, ResourceType};

/// Entry count cap used when none is configured
pub const DEFAULT_MAX_SIZE: usize = 100;

/// A cached value with its expiry and recency bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    /// When the entry was stored
    pub timestamp: Instant,
    pub ttl: Duration,
    /// Bumped on every successful `get`
    pub last_accessed: Instant,
    /// Monotonic recency counter; breaks ties between equal instants
    access_seq: u64,
}

impl<T> CacheEntry<T> {
    /// Valid iff `now - timestamp < ttl`. A zero TTL is never valid.
    pub fn is_valid_at(&self, now: Instant) -> bool {
        self.age_at(now) < self.ttl
    }

    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.timestamp)
    }
}

/// Point-in-time view of one cache, computed without mutating it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, absent before the first lookup
    pub hit_rate: Option<f64>,
}

impl CacheStats {
    pub(crate) fn compute_hit_rate(hits: u64, misses: u64) -> Option<f64> {
        let lookups = hits + misses;
        (lookups > 0).then(|| hits as f64 / lookups as f64)
    }
}

struct Inner<T> {
    entries: HashMap<CacheKey, CacheEntry<T>>,
    next_seq: u64,
}

impl<T> Inner<T> {
    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Bounded, expiring cache for one resource type.
pub struct ResourceCache<T> {
    resource_type: ResourceType,
    default_ttl: Duration,
    max_size: usize,
    inner: Mutex<Inner<T>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T: Clone> ResourceCache<T> {
    pub fn new(resource_type: ResourceType, default_ttl: Duration, max_size: usize) -> Self {
        Self {
            resource_type,
            default_ttl,
            max_size,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                next_seq: 0,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// A poisoned lock only means another caller panicked mid-operation; the
    /// map itself is still structurally sound, so keep serving it.
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a valid entry. Expired entries count as misses and are left
    /// for the next sweep.
    pub fn get<P: QueryParams + ?Sized>(
        &self,
        cluster_id: &str,
        resource_type: ResourceType,
        params: &P,
    ) -> Option<T> {
        self.get_with_age(cluster_id, resource_type, params)
            .map(|(value, _)| value)
    }

    /// Like [`get`](Self::get), also returning how old the entry is.
    pub fn get_with_age<P: QueryParams + ?Sized>(
        &self,
        cluster_id: &str,
        resource_type: ResourceType,
        params: &P,
    ) -> Option<(T, Duration)> {
        let key = CacheKey::new(cluster_id, resource_type, params);
        let now = Instant::now();

        let mut inner = self.lock();
        let seq = inner.bump();
        let found = match inner.entries.get_mut(&key) {
            Some(entry) if entry.is_valid_at(now) => {
                entry.last_accessed = now;
                entry.access_seq = seq;
                Some((entry.value.clone(), entry.age_at(now)))
            }
            _ => None,
        };
        drop(inner);

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::debug!("Cache hit: {} ({})", resource_type, cluster_id);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            log::debug!("Cache miss: {} ({})", resource_type, cluster_id);
        }
        found
    }

    /// Store `data`, replacing any entry under the same key.
    ///
    /// `custom_ttl` overrides the cache default for this entry only. Once
    /// inserted, least-recently-accessed entries are evicted until the cache
    /// is back within `max_size`.
    pub fn set<P: QueryParams + ?Sized>(
        &self,
        cluster_id: &str,
        resource_type: ResourceType,
        data: T,
        params: &P,
        custom_ttl: Option<Duration>,
    ) {
        let key = CacheKey::new(cluster_id, resource_type, params);
        let now = Instant::now();

        let mut inner = self.lock();
        let seq = inner.bump();
        inner.entries.insert(
            key,
            CacheEntry {
                value: data,
                timestamp: now,
                ttl: custom_ttl.unwrap_or(self.default_ttl),
                last_accessed: now,
                access_seq: seq,
            },
        );

        let mut evicted = 0;
        while inner.entries.len() > self.max_size {
            let victim = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| (entry.last_accessed, entry.access_seq))
                .map(|(key, _)| key.clone());
            match victim {
                Some(victim) => {
                    inner.entries.remove(&victim);
                    evicted += 1;
                }
                None => break,
            }
        }

        assert!(
            inner.entries.len() <= self.max_size,
            "{} cache holds {} entries after eviction (max {})",
            self.resource_type,
            inner.entries.len(),
            self.max_size
        );

        if evicted > 0 {
            log::debug!("Evicted {} LRU entries from {} cache", evicted, self.resource_type);
        }
    }

    /// Remove every entry for `cluster_id`, or only those of `resource_type`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&self, cluster_id: &str, resource_type: Option<ResourceType>) -> usize {
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner
            .entries
            .retain(|key, _| !key.matches(cluster_id, resource_type));
        before - inner.entries.len()
    }

    /// Remove all expired entries. Returns the number removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| entry.is_valid_at(now));
        before - inner.entries.len()
    }

    /// Remove everything. Returns the number removed.
    pub fn clear(&self) -> usize {
        let mut inner = self.lock();
        let removed = inner.entries.len();
        inner.entries.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Classify every entry as valid or expired right now.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let (size, valid_entries) = {
            let inner = self.lock();
            let valid = inner
                .entries
                .values()
                .filter(|entry| entry.is_valid_at(now))
                .count();
            (inner.entries.len(), valid)
        };
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);

        CacheStats {
            size,
            max_size: self.max_size,
            valid_entries,
            expired_entries: size - valid_entries,
            hits,
            misses,
            hit_rate: CacheStats::compute_hit_rate(hits, misses),
        }
    }
}

/// Type-erased control surface over a cache, used for fan-out operations.
pub trait CacheControl: Send + Sync {
    fn resource_type(&self) -> ResourceType;
    fn stats(&self) -> CacheStats;
    fn cleanup(&self) -> usize;
    fn clear(&self) -> usize;
    fn invalidate_cluster(&self, cluster_id: &str) -> usize;
}

impl<T: Clone + Send> CacheControl for ResourceCache<T> {
    fn resource_type(&self) -> ResourceType {
        ResourceCache::resource_type(self)
    }

    fn stats(&self) -> CacheStats {
        ResourceCache::stats(self)
    }

    fn cleanup(&self) -> usize {
        ResourceCache::cleanup(self)
    }

    fn clear(&self) -> usize {
        ResourceCache::clear(self)
    }

    fn invalidate_cluster(&self, cluster_id: &str) -> usize {
        self.invalidate(cluster_id, None)
    }
}
