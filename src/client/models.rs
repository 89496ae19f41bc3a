//! Resource models returned by the gateway
//!
//! RabbitMQ resources are proxied from the Management API and keep its
//! snake_case field names. Audit records come from the gateway itself and
//! use camelCase.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::pagination::{AuditFilterParams, PageSelect, QueryParams, ResourceParams};

/// The resource types the console can list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Connections,
    Channels,
    Exchanges,
    Queues,
    Bindings,
    Audit,
}

impl ResourceType {
    pub const ALL: [ResourceType; 6] = [
        ResourceType::Connections,
        ResourceType::Channels,
        ResourceType::Exchanges,
        ResourceType::Queues,
        ResourceType::Bindings,
        ResourceType::Audit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Connections => "connections",
            ResourceType::Channels => "channels",
            ResourceType::Exchanges => "exchanges",
            ResourceType::Queues => "queues",
            ResourceType::Bindings => "bindings",
            ResourceType::Audit => "audit",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listable resource: its wire shape, its parameter struct and its tag.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Params: QueryParams + PageSelect + Clone + Default + fmt::Debug + Send + Sync + 'static;

    const TYPE: ResourceType;
}

/// Client connection to the broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub name: String,

    #[serde(default)]
    pub vhost: String,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub channels: u32,

    #[serde(default)]
    pub protocol: Option<String>,

    #[serde(default)]
    pub peer_host: Option<String>,

    #[serde(default)]
    pub peer_port: Option<u16>,

    #[serde(default)]
    pub node: Option<String>,
}

/// AMQP channel multiplexed over a connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,

    #[serde(default)]
    pub vhost: String,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub number: u32,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub consumer_count: u32,

    #[serde(default)]
    pub prefetch_count: u32,

    #[serde(default)]
    pub messages_unacknowledged: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    /// Empty for the default exchange
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub vhost: String,

    #[serde(rename = "type", default)]
    pub exchange_type: String,

    #[serde(default)]
    pub durable: bool,

    #[serde(default)]
    pub auto_delete: bool,

    #[serde(default)]
    pub internal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queue {
    pub name: String,

    #[serde(default)]
    pub vhost: String,

    #[serde(rename = "type", default)]
    pub queue_type: Option<String>,

    #[serde(default)]
    pub durable: bool,

    #[serde(default)]
    pub auto_delete: bool,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub messages: u64,

    #[serde(default)]
    pub messages_ready: u64,

    #[serde(default)]
    pub messages_unacknowledged: u64,

    #[serde(default)]
    pub consumers: u32,

    #[serde(default)]
    pub node: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Source exchange (empty for the default exchange)
    #[serde(default)]
    pub source: String,

    pub destination: String,

    /// `queue` or `exchange`
    #[serde(default)]
    pub destination_type: String,

    #[serde(default)]
    pub vhost: String,

    #[serde(default)]
    pub routing_key: String,

    #[serde(default)]
    pub properties_key: Option<String>,
}

/// Audit trail entry recorded by the gateway for a management action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: String,

    pub username: String,

    #[serde(default)]
    pub cluster_id: Option<String>,

    /// Operation type (e.g. `CREATE_QUEUE`, `PURGE_QUEUE`)
    pub operation: String,

    #[serde(default)]
    pub resource_type: Option<String>,

    #[serde(default)]
    pub resource_name: Option<String>,

    /// `SUCCESS` or `FAILURE`
    pub status: String,

    /// RFC 3339 timestamp
    pub timestamp: String,

    #[serde(default)]
    pub error_message: Option<String>,
}

impl Resource for Connection {
    type Params = ResourceParams;
    const TYPE: ResourceType = ResourceType::Connections;
}

impl Resource for Channel {
    type Params = ResourceParams;
    const TYPE: ResourceType = ResourceType::Channels;
}

impl Resource for Exchange {
    type Params = ResourceParams;
    const TYPE: ResourceType = ResourceType::Exchanges;
}

impl Resource for Queue {
    type Params = ResourceParams;
    const TYPE: ResourceType = ResourceType::Queues;
}

impl Resource for Binding {
    type Params = ResourceParams;
    const TYPE: ResourceType = ResourceType::Bindings;
}

impl Resource for AuditRecord {
    type Params = AuditFilterParams;
    const TYPE: ResourceType = ResourceType::Audit;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_serde_lowercase() {
        let json = serde_json::to_string(&ResourceType::Queues).unwrap();
        assert_eq!(json, "\"queues\"");
        let parsed: ResourceType = serde_json::from_str("\"bindings\"").unwrap();
        assert_eq!(parsed, ResourceType::Bindings);
    }

    #[test]
    fn test_queue_deserializes_management_fields() {
        let json = r#"{
            "name": "orders",
            "vhost": "/",
            "type": "quorum",
            "durable": true,
            "messages": 12,
            "messages_ready": 10,
            "messages_unacknowledged": 2,
            "consumers": 3,
            "arguments": {"x-queue-type": "quorum"}
        }"#;
        let queue: Queue = serde_json::from_str(json).unwrap();
        assert_eq!(queue.name, "orders");
        assert_eq!(queue.queue_type.as_deref(), Some("quorum"));
        assert_eq!(queue.messages_ready, 10);
        assert_eq!(queue.consumers, 3);
    }

    #[test]
    fn test_default_exchange_has_empty_name() {
        let exchange: Exchange =
            serde_json::from_str(r#"{"vhost": "/", "type": "direct", "durable": true}"#).unwrap();
        assert!(exchange.name.is_empty());
        assert_eq!(exchange.exchange_type, "direct");
    }

    #[test]
    fn test_audit_record_camel_case() {
        let json = r#"{
            "id": "a1",
            "username": "admin",
            "clusterId": "c1",
            "operation": "PURGE_QUEUE",
            "resourceType": "queue",
            "resourceName": "orders",
            "status": "SUCCESS",
            "timestamp": "2026-01-01T00:00:00Z"
        }"#;
        let record: AuditRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.cluster_id.as_deref(), Some("c1"));
        assert_eq!(record.resource_name.as_deref(), Some("orders"));
        assert!(record.error_message.is_none());
    }
}
