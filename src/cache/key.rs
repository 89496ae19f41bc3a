//! Cache key derivation
//!
//! A key keeps the cluster id and resource type in the clear, so invalidation
//! can match on them, and reduces the request parameters to a SHA-256
//! fingerprint of their canonical (sorted) form.

use sha2::{Digest, Sha256};

use crate::client::{QueryParams, ResourceType};

/// Deterministic address of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    cluster_id: String,
    resource_type: ResourceType,
    fingerprint: String,
}

impl CacheKey {
    /// Derive the key for a typed parameter struct.
    pub fn new<P: QueryParams + ?Sized>(
        cluster_id: &str,
        resource_type: ResourceType,
        params: &P,
    ) -> Self {
        let pairs = params.query_pairs();
        let pairs_ref: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        Self::from_pairs(cluster_id, resource_type, &pairs_ref)
    }

    /// Derive the key from raw `(name, value)` pairs in any order.
    pub fn from_pairs(cluster_id: &str, resource_type: ResourceType, params: &[(&str, &str)]) -> Self {
        Self {
            cluster_id: cluster_id.to_string(),
            resource_type,
            fingerprint: params_fingerprint(params),
        }
    }

    pub fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Whether this key falls under an invalidation scope.
    pub fn matches(&self, cluster_id: &str, resource_type: Option<ResourceType>) -> bool {
        self.cluster_id == cluster_id && resource_type.is_none_or(|rt| rt == self.resource_type)
    }
}

/// Hex SHA-256 of the parameters sorted by name.
///
/// Names and values are length-prefixed so a value containing separator
/// characters cannot alias a different parameter set.
pub fn params_fingerprint(params: &[(&str, &str)]) -> String {
    let mut sorted_params: Vec<_> = params.iter().collect();
    sorted_params.sort();

    let mut hasher = Sha256::new();
    for (k, v) in sorted_params {
        hasher.update((k.len() as u64).to_le_bytes());
        hasher.update(k.as_bytes());
        hasher.update((v.len() as u64).to_le_bytes());
        hasher.update(v.as_bytes());
    }

    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ResourceParams;

    #[test]
    fn test_cache_key_deterministic() {
        let key1 = CacheKey::from_pairs(
            "c1",
            ResourceType::Queues,
            &[("pageSize", "10"), ("page", "1"), ("name", "orders")],
        );
        let key2 = CacheKey::from_pairs(
            "c1",
            ResourceType::Queues,
            &[("name", "orders"), ("page", "1"), ("pageSize", "10")],
        );

        // Same inputs in different order should produce same key
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_typed_params_match_raw_pairs() {
        let typed = CacheKey::new("c1", ResourceType::Queues, &ResourceParams::new().page(2));
        let raw = CacheKey::from_pairs(
            "c1",
            ResourceType::Queues,
            &[("pageSize", "50"), ("page", "2")],
        );
        assert_eq!(typed, raw);
    }

    #[test]
    fn test_cache_key_different_types() {
        let params = ResourceParams::new();
        let key1 = CacheKey::new("c1", ResourceType::Queues, &params);
        let key2 = CacheKey::new("c1", ResourceType::Exchanges, &params);
        assert_ne!(key1, key2);
        assert_eq!(key1.fingerprint(), key2.fingerprint());
    }

    #[test]
    fn test_cache_key_different_clusters() {
        let params = ResourceParams::new();
        let key1 = CacheKey::new("c1", ResourceType::Queues, &params);
        let key2 = CacheKey::new("c2", ResourceType::Queues, &params);
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_separators_do_not_alias() {
        let a = params_fingerprint(&[("name", "a&page=2")]);
        let b = params_fingerprint(&[("name", "a"), ("page", "2")]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_matches_scope() {
        let key = CacheKey::new("c1", ResourceType::Queues, &ResourceParams::new());
        assert!(key.matches("c1", None));
        assert!(key.matches("c1", Some(ResourceType::Queues)));
        assert!(!key.matches("c1", Some(ResourceType::Channels)));
        assert!(!key.matches("c2", None));
    }
}
