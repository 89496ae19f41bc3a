//! The fixed set of named caches, one per resource type

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::CacheTtl;
use super::store::{CacheControl, DEFAULT_MAX_SIZE, ResourceCache};
use crate::client::{
    AuditRecord, Binding, Channel, Connection, Exchange, PagedResponse, Queue, Resource,
    ResourceType,
};
use crate::refresh::RepeatingTask;

type PageCache<R> = Arc<ResourceCache<PagedResponse<R>>>;

/// One cache instance per resource type, created once and shared by every
/// controller and by the statistics aggregator.
pub struct CacheRegistry {
    connections: PageCache<Connection>,
    channels: PageCache<Channel>,
    exchanges: PageCache<Exchange>,
    queues: PageCache<Queue>,
    bindings: PageCache<Binding>,
    audit: PageCache<AuditRecord>,
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE, &HashMap::new())
    }
}

impl CacheRegistry {
    /// Build every cache with `max_size` entries and the standard TTLs,
    /// except where `ttl_overrides` names a different one.
    pub fn new(max_size: usize, ttl_overrides: &HashMap<ResourceType, Duration>) -> Self {
        let ttl = |rt: ResourceType| {
            ttl_overrides
                .get(&rt)
                .copied()
                .unwrap_or_else(|| CacheTtl::for_type(rt))
        };
        fn build<R: Resource>(ttl: Duration, max_size: usize) -> PageCache<R> {
            Arc::new(ResourceCache::new(R::TYPE, ttl, max_size))
        }

        Self {
            connections: build(ttl(ResourceType::Connections), max_size),
            channels: build(ttl(ResourceType::Channels), max_size),
            exchanges: build(ttl(ResourceType::Exchanges), max_size),
            queues: build(ttl(ResourceType::Queues), max_size),
            bindings: build(ttl(ResourceType::Bindings), max_size),
            audit: build(ttl(ResourceType::Audit), max_size),
        }
    }

    /// Every TTL forced to zero: entries are stored but never served.
    pub fn disabled() -> Self {
        let zero: HashMap<_, _> = ResourceType::ALL
            .iter()
            .map(|rt| (*rt, Duration::ZERO))
            .collect();
        Self::new(DEFAULT_MAX_SIZE, &zero)
    }

    /// Typed handle to the cache for `R`.
    pub fn cache<R: CachedResource>(&self) -> PageCache<R> {
        R::select(self).clone()
    }

    /// Type-erased handles to every cache, in [`ResourceType::ALL`] order.
    pub fn all(&self) -> [&dyn CacheControl; 6] {
        [
            self.connections.as_ref(),
            self.channels.as_ref(),
            self.exchanges.as_ref(),
            self.queues.as_ref(),
            self.bindings.as_ref(),
            self.audit.as_ref(),
        ]
    }

    /// Reap expired entries everywhere. Returns the number removed.
    pub fn cleanup_all(&self) -> usize {
        self.all().iter().map(|cache| cache.cleanup()).sum()
    }

    /// Drop everything, e.g. on logout.
    pub fn clear_all(&self) -> usize {
        self.all().iter().map(|cache| cache.clear()).sum()
    }

    /// Drop every entry for one cluster across all resource types.
    pub fn invalidate_cluster(&self, cluster_id: &str) -> usize {
        self.all()
            .iter()
            .map(|cache| cache.invalidate_cluster(cluster_id))
            .sum()
    }

    /// Start the periodic expiry sweep.
    pub fn spawn_cleanup(self: &Arc<Self>, interval: Duration) -> RepeatingTask {
        let registry = Arc::clone(self);
        RepeatingTask::every("cache-cleanup", interval, move || {
            let registry = Arc::clone(&registry);
            async move {
                let removed = registry.cleanup_all();
                if removed > 0 {
                    log::debug!("Cache sweep removed {} expired entries", removed);
                }
            }
        })
    }
}

/// Resources that have a slot in the [`CacheRegistry`].
pub trait CachedResource: Resource {
    fn select(registry: &CacheRegistry) -> &PageCache<Self>;
}

macro_rules! cached_resource {
    ($ty:ty, $field:ident) => {
        impl CachedResource for $ty {
            fn select(registry: &CacheRegistry) -> &PageCache<Self> {
                &registry.$field
            }
        }
    };
}

cached_resource!(Connection, connections);
cached_resource!(Channel, channels);
cached_resource!(Exchange, exchanges);
cached_resource!(Queue, queues);
cached_resource!(Binding, bindings);
cached_resource!(AuditRecord, audit);
