//! JSON output formatting

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Wrapper for JSON output with metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T> {
    /// The actual data
    pub data: T,

    /// Metadata about the response
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// Timestamp of the response
    pub timestamp: String,

    /// CLI version
    pub version: String,

    /// Position of `data` in a paginated listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// Whether the page was answered by the local cache
    pub from_cache: bool,
}

impl PageMeta {
    pub fn footer(&self) -> String {
        format!(
            "Page {} of {} ({} total{})",
            self.page,
            self.total_pages.max(1),
            self.total_items,
            if self.from_cache { ", cached" } else { "" }
        )
    }
}

impl<T> JsonOutput<T> {
    /// Create a new JSON output with metadata
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                pagination: None,
            },
        }
    }

    pub fn with_pagination(mut self, page: PageMeta) -> Self {
        self.meta.pagination = Some(page);
        self
    }
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    let output = JsonOutput::new(data);
    serde_json::to_string_pretty(&output)
}

/// Format one page of data with its pagination metadata
pub fn format_json_paged<T: Serialize + ?Sized>(
    data: &T,
    page: PageMeta,
) -> Result<String, serde_json::Error> {
    let output = JsonOutput::new(data).with_pagination(page);
    serde_json::to_string_pretty(&output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Clone)]
    struct QueueRow {
        name: String,
        messages: u64,
    }

    fn meta(page: usize, total_items: usize, total_pages: usize, from_cache: bool) -> PageMeta {
        PageMeta {
            page,
            page_size: 10,
            total_items,
            total_pages,
            from_cache,
        }
    }

    #[test]
    fn test_envelope_carries_version_and_timestamp() {
        let output = JsonOutput::new(vec!["orders", "payments"]);

        assert_eq!(output.data, vec!["orders", "payments"]);
        assert_eq!(output.meta.version, env!("CARGO_PKG_VERSION"));
        assert!(!output.meta.timestamp.is_empty());
        assert!(output.meta.pagination.is_none());
    }

    #[test]
    fn test_unpaged_output_omits_pagination() {
        let rows = vec![QueueRow {
            name: "orders".to_string(),
            messages: 4,
        }];

        let result = format_json(&rows).unwrap();

        assert!(result.contains("\"name\": \"orders\""));
        assert!(result.contains("\"messages\": 4"));
        assert!(!result.contains("\"pagination\""));
    }

    #[test]
    fn test_empty_listing_is_empty_array() {
        let result = format_json(&Vec::<QueueRow>::new()).unwrap();
        assert!(result.contains("\"data\": []"));
    }

    #[test]
    fn test_paged_output_uses_camel_case_meta() {
        let result = format_json_paged(&Vec::<QueueRow>::new(), meta(2, 25, 3, true)).unwrap();

        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(value["meta"]["pagination"]["page"], 2);
        assert_eq!(value["meta"]["pagination"]["pageSize"], 10);
        assert_eq!(value["meta"]["pagination"]["totalPages"], 3);
        assert_eq!(value["meta"]["pagination"]["fromCache"], true);
    }

    #[test]
    fn test_footer() {
        assert_eq!(meta(1, 0, 0, false).footer(), "Page 1 of 1 (0 total)");
        assert_eq!(meta(2, 25, 3, true).footer(), "Page 2 of 3 (25 total, cached)");
    }
}
