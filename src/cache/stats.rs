//! Cross-cache statistics and fan-out commands

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

use super::registry::CacheRegistry;
use super::store::CacheStats;
use crate::client::ResourceType;
use crate::refresh::RepeatingTask;

/// Default polling period for [`CacheStatsAggregator::start`]
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Per-resource stats plus their sums.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateStats {
    pub per_resource: BTreeMap<ResourceType, CacheStats>,
    pub totals: CacheStats,
}

impl AggregateStats {
    pub fn collect(registry: &CacheRegistry) -> Self {
        let per_resource: BTreeMap<_, _> = registry
            .all()
            .iter()
            .map(|cache| (cache.resource_type(), cache.stats()))
            .collect();

        let mut totals = per_resource
            .values()
            .fold(CacheStats::default(), |mut acc, s| {
                acc.size += s.size;
                acc.max_size += s.max_size;
                acc.valid_entries += s.valid_entries;
                acc.expired_entries += s.expired_entries;
                acc.hits += s.hits;
                acc.misses += s.misses;
                acc
            });
        totals.hit_rate = CacheStats::compute_hit_rate(totals.hits, totals.misses);

        Self {
            per_resource,
            totals,
        }
    }
}

/// Polls every cache in a registry and publishes the result.
pub struct CacheStatsAggregator {
    registry: Arc<CacheRegistry>,
    tx: watch::Sender<AggregateStats>,
    poller: Mutex<Option<RepeatingTask>>,
}

impl CacheStatsAggregator {
    pub fn new(registry: Arc<CacheRegistry>) -> Self {
        let (tx, _) = watch::channel(AggregateStats::collect(&registry));
        Self {
            registry,
            tx,
            poller: Mutex::new(None),
        }
    }

    /// Begin publishing a fresh snapshot every `interval`. Restarting replaces
    /// the previous poller.
    pub fn start(self: &Arc<Self>, interval: Duration) {
        let weak = Arc::downgrade(self);
        let task = RepeatingTask::every("cache-stats", interval, move || {
            let weak = weak.clone();
            async move {
                if let Some(aggregator) = weak.upgrade() {
                    aggregator.publish();
                }
            }
        });
        let previous = self
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    pub fn stop(&self) {
        if let Some(task) = self
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.cancel();
        }
    }

    /// Compute a snapshot right now without waiting for the poller.
    pub fn snapshot(&self) -> AggregateStats {
        AggregateStats::collect(&self.registry)
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> AggregateStats {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AggregateStats> {
        self.tx.subscribe()
    }

    /// Recompute and publish immediately.
    pub fn publish(&self) -> AggregateStats {
        let stats = self.snapshot();
        self.tx.send_replace(stats.clone());
        stats
    }

    pub fn clear_all_caches(&self) -> usize {
        let removed = self.registry.clear_all();
        log::debug!("Cleared {} entries across all caches", removed);
        self.publish();
        removed
    }

    pub fn invalidate_cluster_caches(&self, cluster_id: &str) -> usize {
        let removed = self.registry.invalidate_cluster(cluster_id);
        log::debug!("Invalidated {} entries for cluster {}", removed, cluster_id);
        self.publish();
        removed
    }
}

impl Drop for CacheStatsAggregator {
    fn drop(&mut self) {
        self.stop();
    }
}
