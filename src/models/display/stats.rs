//! Cache statistics display model

use serde::Serialize;
use tabled::Tabled;

use super::common::DASH;
use crate::cache::{AggregateStats, CacheStats};

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct CacheStatsDisplay {
    #[tabled(rename = "CACHE")]
    pub resource: String,

    /// `size/max_size`
    #[tabled(rename = "ENTRIES")]
    pub entries: String,

    #[tabled(rename = "VALID")]
    pub valid: usize,

    #[tabled(rename = "EXPIRED")]
    pub expired: usize,

    #[tabled(rename = "HITS")]
    pub hits: u64,

    #[tabled(rename = "MISSES")]
    pub misses: u64,

    #[tabled(rename = "HIT RATE")]
    pub hit_rate: String,
}

impl CacheStatsDisplay {
    fn new(resource: &str, stats: &CacheStats) -> Self {
        Self {
            resource: resource.to_string(),
            entries: format!("{}/{}", stats.size, stats.max_size),
            valid: stats.valid_entries,
            expired: stats.expired_entries,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats
                .hit_rate
                .map(|rate| format!("{:.1}%", rate * 100.0))
                .unwrap_or_else(|| DASH.to_string()),
        }
    }

    /// One row per cache, then a `total` row.
    pub fn rows(stats: &AggregateStats) -> Vec<Self> {
        stats
            .per_resource
            .iter()
            .map(|(rt, s)| Self::new(rt.as_str(), s))
            .chain(std::iter::once(Self::new("total", &stats.totals)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheRegistry;

    #[test]
    fn test_rows_end_with_totals() {
        let stats = AggregateStats::collect(&CacheRegistry::default());
        let rows = CacheStatsDisplay::rows(&stats);

        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].resource, "connections");
        let total = rows.last().unwrap();
        assert_eq!(total.resource, "total");
        assert_eq!(total.entries, "0/600");
        assert_eq!(total.hit_rate, "--");
    }

    #[test]
    fn test_hit_rate_percentage() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            hit_rate: Some(0.75),
            ..CacheStats::default()
        };
        assert_eq!(CacheStatsDisplay::new("queues", &stats).hit_rate, "75.0%");
    }
}
