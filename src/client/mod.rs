//! Gateway client: resource models and the fetcher boundary

use async_trait::async_trait;

use crate::error::ApiResult;

pub mod gateway;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod pagination;
pub mod parallel;

pub use gateway::GatewayClient;
#[cfg(test)]
pub use mock::MockFetcher;
pub use models::{
    AuditRecord, Binding, Channel, Connection, Exchange, Queue, Resource, ResourceType,
};
pub use pagination::{
    AuditFilterParams, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageSelect, PagedResponse, QueryParams,
    ResourceParams,
};
pub use parallel::fetch_remaining_pages;

/// Fetches one page of one resource type from the gateway.
///
/// Implementations shape-validate the response and return a classified
/// [`ApiError`](crate::error::ApiError) on any failure. They never retry.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch_page<R: Resource>(
        &self,
        cluster_id: &str,
        params: &R::Params,
    ) -> ApiResult<PagedResponse<R>>;
}
