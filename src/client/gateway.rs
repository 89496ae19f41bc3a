//! HTTP fetcher for the console gateway

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client as HttpClient, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::{PagedResponse, QueryParams, Resource, ResourceFetcher, ResourceType};
use crate::error::{ApiError, ApiResult, ConfigError, Result};

/// Gateway base URL used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client-side cap so auto-refresh loops cannot flood the gateway
const RATE_LIMIT_PER_SECOND: u32 = 20;

/// Gateway client speaking the paginated resource endpoints
pub struct GatewayClient {
    http: HttpClient,
    base_url: Url,
    token: Option<String>,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl GatewayClient {
    /// Create a client for `base_url`.
    ///
    /// `timeout` bounds every request; an elapsed timeout surfaces as a
    /// network error.
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::Invalid(format!("Invalid gateway URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!("Invalid gateway URL '{}'", base_url)).into());
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            http,
            base_url,
            token,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build the listing URL for a resource type.
    ///
    /// RabbitMQ resources live under the cluster; the audit trail is global and
    /// filtered by a `clusterId` query parameter instead.
    fn resource_url(&self, cluster_id: &str, resource_type: ResourceType) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            match resource_type {
                ResourceType::Audit => {
                    segments.extend(["api", "audits"]);
                }
                other => {
                    segments.extend(["api", "rabbitmq", cluster_id, "resources", other.as_str()]);
                }
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&'static str, String)],
    ) -> ApiResult<T> {
        self.rate_limiter.until_ready().await;

        log::debug!("GET {}", url);
        let mut request = self.http.get(url).query(query);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(ApiError::from)?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await.map_err(ApiError::from)?;
            return serde_json::from_str::<T>(&body).map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
            });
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ApiError::RateLimit(Duration::from_secs(retry_after)));
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status.as_u16(), body))
    }
}

#[async_trait]
impl ResourceFetcher for GatewayClient {
    async fn fetch_page<R: Resource>(
        &self,
        cluster_id: &str,
        params: &R::Params,
    ) -> ApiResult<PagedResponse<R>> {
        let url = self.resource_url(cluster_id, R::TYPE);
        let mut query = params.query_pairs();
        if R::TYPE == ResourceType::Audit {
            query.push(("clusterId", cluster_id.to_string()));
        }

        let page: PagedResponse<R> = self.get_json(url, &query).await?;
        page.validate()?;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{AuditFilterParams, AuditRecord, Queue, ResourceParams};
    use crate::error::ErrorKind;
    use mockito::Matcher;

    const QUEUE_PAGE: &str = r#"{
        "items": [{"name": "q1", "vhost": "/", "messages": 4}],
        "page": 1,
        "pageSize": 50,
        "totalItems": 1,
        "totalPages": 1,
        "hasNext": false,
        "hasPrevious": false
    }"#;

    fn client_for(server: &mockito::ServerGuard) -> GatewayClient {
        GatewayClient::new(&server.url(), Some("tok".to_string()), DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(GatewayClient::new("not a url", None, DEFAULT_TIMEOUT).is_err());
    }

    #[test]
    fn test_resource_url_layout() {
        let client = GatewayClient::new("http://gw.local/console/", None, DEFAULT_TIMEOUT).unwrap();
        let url = client.resource_url("prod cluster", ResourceType::Queues);
        assert_eq!(
            url.as_str(),
            "http://gw.local/console/api/rabbitmq/prod%20cluster/resources/queues"
        );
        let audit = client.resource_url("c1", ResourceType::Audit);
        assert_eq!(audit.as_str(), "http://gw.local/console/api/audits");
    }

    #[tokio::test]
    async fn test_fetch_queues_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/rabbitmq/c1/resources/queues")
            .match_header("authorization", "Bearer tok")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("pageSize".into(), "50".into()),
                Matcher::UrlEncoded("name".into(), "q.*".into()),
                Matcher::UrlEncoded("useRegex".into(), "true".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(QUEUE_PAGE)
            .create_async()
            .await;

        let client = client_for(&server);
        let params = ResourceParams::new().name("q.*").regex(true);
        let page = client.fetch_page::<Queue>("c1", &params).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "q1");
        assert_eq!(page.items[0].messages, 4);
    }

    #[tokio::test]
    async fn test_fetch_audit_passes_cluster_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/audits")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("clusterId".into(), "c9".into()),
                Matcher::UrlEncoded("username".into(), "alice".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"items": [], "page": 1, "pageSize": 50, "totalItems": 0,
                    "totalPages": 0, "hasNext": false, "hasPrevious": false}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let params = AuditFilterParams::new().username("alice");
        let page = client.fetch_page::<AuditRecord>("c9", &params).await.unwrap();

        mock.assert_async().await;
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_status_codes_are_classified() {
        let mut server = mockito::Server::new_async().await;
        let _unauthorized = server
            .mock("GET", "/api/rabbitmq/c1/resources/queues")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;
        let _unavailable = server
            .mock("GET", "/api/rabbitmq/c1/resources/channels")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("broker down")
            .create_async()
            .await;

        let client = client_for(&server);
        let params = ResourceParams::new();

        let err = client.fetch_page::<Queue>("c1", &params).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);

        let err = client
            .fetch_page::<crate::client::Channel>("c1", &params)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClusterUnavailable);
        assert!(err.to_string().contains("broker down"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/rabbitmq/c1/resources/queues")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"items": "nope"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .fetch_page::<Queue>("c1", &ResourceParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        assert_eq!(err.kind(), ErrorKind::Api);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let client = GatewayClient::new("http://127.0.0.1:1", None, DEFAULT_TIMEOUT).unwrap();
        let err = client
            .fetch_page::<Queue>("c1", &ResourceParams::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
