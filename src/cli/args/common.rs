//! Common CLI types shared across commands

use crate::client::ResourceType;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - human-optimized rich formatting
    #[default]
    Pretty,
    /// Table format - machine-parseable, one row per entry
    Table,
    /// JSON format - structured for scripts/APIs
    Json,
}

/// Broker resources listed through the cluster proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BrokerResource {
    Connections,
    Channels,
    Exchanges,
    Queues,
    Bindings,
}

impl From<BrokerResource> for ResourceType {
    fn from(resource: BrokerResource) -> Self {
        match resource {
            BrokerResource::Connections => ResourceType::Connections,
            BrokerResource::Channels => ResourceType::Channels,
            BrokerResource::Exchanges => ResourceType::Exchanges,
            BrokerResource::Queues => ResourceType::Queues,
            BrokerResource::Bindings => ResourceType::Bindings,
        }
    }
}
