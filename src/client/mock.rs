//! Mock gateway fetcher for testing
//!
//! Serves canned items per resource type, paginated according to the request
//! parameters, without making real HTTP calls.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{PagedResponse, QueryParams, Resource, ResourceFetcher, ResourceType};
use crate::error::{ApiError, ApiResult};

/// Mock fetcher for testing.
///
/// # Example
/// ```ignore
/// let mock = MockFetcher::new()
///     .with_items(ResourceType::Queues, vec![json!({"name": "q1"})])
///     .await;
///
/// let page = mock.fetch_page::<Queue>("c1", &ResourceParams::new()).await?;
/// assert_eq!(page.items.len(), 1);
/// ```
#[derive(Default)]
pub struct MockFetcher {
    /// Raw items to serve per resource type
    items: Arc<Mutex<HashMap<ResourceType, Vec<Value>>>>,
    /// Errors to return, consumed one per call
    errors: Arc<Mutex<VecDeque<ApiError>>>,
    /// Simulated network latency applied before answering
    latency: Arc<Mutex<Option<Duration>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Captured requests for test assertions
    captured_requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// Tracks fetch counts per resource type
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub connections: usize,
    pub channels: usize,
    pub exchanges: usize,
    pub queues: usize,
    pub bindings: usize,
    pub audit: usize,
}

impl CallCounts {
    fn record(&mut self, resource_type: ResourceType) {
        match resource_type {
            ResourceType::Connections => self.connections += 1,
            ResourceType::Channels => self.channels += 1,
            ResourceType::Exchanges => self.exchanges += 1,
            ResourceType::Queues => self.queues += 1,
            ResourceType::Bindings => self.bindings += 1,
            ResourceType::Audit => self.audit += 1,
        }
    }

    /// Get total number of fetches made.
    pub fn total(&self) -> usize {
        self.connections + self.channels + self.exchanges + self.queues + self.bindings + self.audit
    }
}

/// A captured fetch for test assertions.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub cluster_id: String,
    pub resource_type: ResourceType,
    pub query: Vec<(&'static str, String)>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure items served for a resource type.
    pub async fn with_items(self, resource_type: ResourceType, items: Vec<Value>) -> Self {
        self.set_items(resource_type, items).await;
        self
    }

    /// Queue an error for the next call.
    pub async fn with_error(self, error: ApiError) -> Self {
        self.push_error(error).await;
        self
    }

    /// Delay every answer by `latency`.
    pub async fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().await = Some(latency);
        self
    }

    /// Replace the items served for a resource type.
    pub async fn set_items(&self, resource_type: ResourceType, items: Vec<Value>) {
        self.items.lock().await.insert(resource_type, items);
    }

    /// Queue an error to be returned by a subsequent call.
    pub async fn push_error(&self, error: ApiError) {
        self.errors.lock().await.push_back(error);
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.captured_requests.lock().await.clone()
    }
}

/// Read a numeric query pair, falling back when absent or malformed.
fn query_number(query: &[(&'static str, String)], key: &str, default: usize) -> usize {
    query
        .iter()
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or(default)
}

#[async_trait]
impl ResourceFetcher for MockFetcher {
    async fn fetch_page<R: Resource>(
        &self,
        cluster_id: &str,
        params: &R::Params,
    ) -> ApiResult<PagedResponse<R>> {
        let query = params.query_pairs();
        self.call_count.lock().await.record(R::TYPE);
        self.captured_requests.lock().await.push(CapturedRequest {
            cluster_id: cluster_id.to_string(),
            resource_type: R::TYPE,
            query: query.clone(),
        });

        let latency = *self.latency.lock().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(error) = self.errors.lock().await.pop_front() {
            return Err(error);
        }

        let raw = self
            .items
            .lock()
            .await
            .get(&R::TYPE)
            .cloned()
            .unwrap_or_default();
        let items = raw
            .into_iter()
            .map(serde_json::from_value::<R>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        let page = query_number(&query, "page", 1).max(1);
        let page_size = query_number(&query, "pageSize", items.len().max(1)).max(1);
        let total = items.len();
        let slice = items
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        Ok(PagedResponse::new(slice, page, page_size, total))
    }
}
