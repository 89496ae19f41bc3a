//! Client-side cache for gateway listings
//!
//! In-memory, per-resource-type caches with TTL expiry and LRU eviction,
//! shared through a [`CacheRegistry`] built by the composition root.

pub mod key;
pub mod registry;
pub mod stats;
pub mod store;

use std::time::Duration;

use crate::client::ResourceType;

/// Cache TTL configuration per resource type
///
/// Tuned to how quickly each kind of broker state changes.
pub struct CacheTtl;

impl CacheTtl {
    // Highly dynamic: clients come and go constantly
    pub const CONNECTIONS: Duration = Duration::from_secs(30);
    pub const CHANNELS: Duration = Duration::from_secs(30);

    // Message counts move, topology mostly doesn't
    pub const QUEUES: Duration = Duration::from_secs(60);

    // Mostly static configuration
    pub const EXCHANGES: Duration = Duration::from_secs(5 * 60); // 5 min
    pub const BINDINGS: Duration = Duration::from_secs(10 * 60); // 10 min

    // Append-only trail; new records appear as users act
    pub const AUDIT: Duration = Duration::from_secs(2 * 60); // 2 min

    pub fn for_type(resource_type: ResourceType) -> Duration {
        match resource_type {
            ResourceType::Connections => Self::CONNECTIONS,
            ResourceType::Channels => Self::CHANNELS,
            ResourceType::Queues => Self::QUEUES,
            ResourceType::Exchanges => Self::EXCHANGES,
            ResourceType::Bindings => Self::BINDINGS,
            ResourceType::Audit => Self::AUDIT,
        }
    }
}

pub use key::CacheKey;
pub use registry::{CacheRegistry, CachedResource};
pub use stats::{AggregateStats, CacheStatsAggregator};
pub use store::{CacheControl, CacheEntry, CacheStats, DEFAULT_MAX_SIZE, ResourceCache};
