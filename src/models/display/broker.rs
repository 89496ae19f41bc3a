//! Display models for broker resources

use serde::Serialize;
use tabled::Tabled;

use super::common::{DASH, check, or_dash, truncate_string};
use crate::client::{Binding, Channel, Connection, Exchange, Queue};

/// Long generated names (server-named queues, connection peers) are cut to this
const NAME_WIDTH: usize = 48;

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ConnectionDisplay {
    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "VHOST")]
    pub vhost: String,

    #[tabled(rename = "USER")]
    pub user: String,

    #[tabled(rename = "STATE")]
    pub state: String,

    #[tabled(rename = "PROTOCOL")]
    pub protocol: String,

    #[tabled(rename = "CHANNELS")]
    pub channels: u32,

    /// `host:port` of the client
    #[tabled(rename = "PEER")]
    pub peer: String,
}

impl From<&Connection> for ConnectionDisplay {
    fn from(conn: &Connection) -> Self {
        let peer = match (&conn.peer_host, conn.peer_port) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.clone(),
            _ => DASH.to_string(),
        };

        Self {
            name: truncate_string(&conn.name, NAME_WIDTH),
            vhost: conn.vhost.clone(),
            user: or_dash(Some(&conn.user)),
            state: or_dash(conn.state.as_deref()),
            protocol: or_dash(conn.protocol.as_deref()),
            channels: conn.channels,
            peer,
        }
    }
}

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ChannelDisplay {
    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "VHOST")]
    pub vhost: String,

    #[tabled(rename = "USER")]
    pub user: String,

    #[tabled(rename = "STATE")]
    pub state: String,

    #[tabled(rename = "CONSUMERS")]
    pub consumers: u32,

    #[tabled(rename = "PREFETCH")]
    pub prefetch: u32,

    #[tabled(rename = "UNACKED")]
    pub unacked: u64,
}

impl From<&Channel> for ChannelDisplay {
    fn from(channel: &Channel) -> Self {
        Self {
            name: truncate_string(&channel.name, NAME_WIDTH),
            vhost: channel.vhost.clone(),
            user: or_dash(Some(&channel.user)),
            state: or_dash(channel.state.as_deref()),
            consumers: channel.consumer_count,
            prefetch: channel.prefetch_count,
            unacked: channel.messages_unacknowledged,
        }
    }
}

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ExchangeDisplay {
    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "VHOST")]
    pub vhost: String,

    #[tabled(rename = "TYPE")]
    pub exchange_type: String,

    #[tabled(rename = "DURABLE")]
    pub durable: String,

    #[tabled(rename = "AUTO-DEL")]
    pub auto_delete: String,

    #[tabled(rename = "INTERNAL")]
    pub internal: String,
}

impl From<&Exchange> for ExchangeDisplay {
    fn from(exchange: &Exchange) -> Self {
        // The default exchange has an empty name
        let name = if exchange.name.is_empty() {
            "(AMQP default)".to_string()
        } else {
            exchange.name.clone()
        };

        Self {
            name,
            vhost: exchange.vhost.clone(),
            exchange_type: or_dash(Some(&exchange.exchange_type)),
            durable: check(exchange.durable),
            auto_delete: check(exchange.auto_delete),
            internal: check(exchange.internal),
        }
    }
}

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct QueueDisplay {
    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "VHOST")]
    pub vhost: String,

    #[tabled(rename = "TYPE")]
    pub queue_type: String,

    #[tabled(rename = "STATE")]
    pub state: String,

    #[tabled(rename = "READY")]
    pub ready: u64,

    #[tabled(rename = "UNACKED")]
    pub unacked: u64,

    #[tabled(rename = "TOTAL")]
    pub total: u64,

    #[tabled(rename = "CONSUMERS")]
    pub consumers: u32,
}

impl From<&Queue> for QueueDisplay {
    fn from(queue: &Queue) -> Self {
        Self {
            name: truncate_string(&queue.name, NAME_WIDTH),
            vhost: queue.vhost.clone(),
            queue_type: or_dash(queue.queue_type.as_deref()),
            state: or_dash(queue.state.as_deref()),
            ready: queue.messages_ready,
            unacked: queue.messages_unacknowledged,
            total: queue.messages,
            consumers: queue.consumers,
        }
    }
}

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct BindingDisplay {
    #[tabled(rename = "SOURCE")]
    pub source: String,

    #[tabled(rename = "DESTINATION")]
    pub destination: String,

    #[tabled(rename = "KIND")]
    pub destination_type: String,

    #[tabled(rename = "ROUTING KEY")]
    pub routing_key: String,

    #[tabled(rename = "VHOST")]
    pub vhost: String,
}

impl From<&Binding> for BindingDisplay {
    fn from(binding: &Binding) -> Self {
        let source = if binding.source.is_empty() {
            "(AMQP default)".to_string()
        } else {
            binding.source.clone()
        };

        Self {
            source,
            destination: truncate_string(&binding.destination, NAME_WIDTH),
            destination_type: or_dash(Some(&binding.destination_type)),
            routing_key: or_dash(Some(&binding.routing_key)),
            vhost: binding.vhost.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_peer() {
        let conn: Connection = serde_json::from_value(serde_json::json!({
            "name": "10.0.0.5:41234 -> 10.0.0.1:5672",
            "vhost": "/",
            "user": "app",
            "state": "running",
            "channels": 2,
            "protocol": "AMQP 0-9-1",
            "peer_host": "10.0.0.5",
            "peer_port": 41234
        }))
        .unwrap();

        let display = ConnectionDisplay::from(&conn);
        assert_eq!(display.peer, "10.0.0.5:41234");
        assert_eq!(display.state, "running");
        assert_eq!(display.channels, 2);
    }

    #[test]
    fn test_queue_defaults_render_dashes() {
        let queue: Queue = serde_json::from_value(serde_json::json!({"name": "orders"})).unwrap();
        let display = QueueDisplay::from(&queue);
        assert_eq!(display.queue_type, "--");
        assert_eq!(display.state, "--");
        assert_eq!(display.total, 0);
    }

    #[test]
    fn test_default_exchange_name() {
        let exchange: Exchange =
            serde_json::from_value(serde_json::json!({"name": "", "type": "direct", "durable": true}))
                .unwrap();
        let display = ExchangeDisplay::from(&exchange);
        assert_eq!(display.name, "(AMQP default)");
        assert_eq!(display.durable, "\u{2713}");
        assert_eq!(display.internal, "");
    }

    #[test]
    fn test_binding_routing_key() {
        let binding: Binding = serde_json::from_value(serde_json::json!({
            "source": "orders.topic",
            "destination": "orders",
            "destination_type": "queue",
            "routing_key": "orders.*"
        }))
        .unwrap();
        let display = BindingDisplay::from(&binding);
        assert_eq!(display.routing_key, "orders.*");
        assert_eq!(display.destination_type, "queue");
    }
}
