//! Display model implementations for table and JSON output
//!
//! Display models transform gateway resources into CLI-friendly rows with
//! appropriate column names and serialization.

mod audit;
mod broker;
mod common;
mod stats;

use serde::Serialize;
use tabled::Tabled;

use crate::cache::CachedResource;
use crate::client::{AuditRecord, Binding, Channel, Connection, Exchange, Queue};

pub use audit::AuditDisplay;
pub use broker::{BindingDisplay, ChannelDisplay, ConnectionDisplay, ExchangeDisplay, QueueDisplay};
pub use stats::CacheStatsDisplay;

/// A resource with a table row representation
pub trait Displayable: CachedResource {
    type Row: Tabled + Serialize + for<'a> From<&'a Self>;

    fn rows(items: &[Self]) -> Vec<Self::Row> {
        items.iter().map(Self::Row::from).collect()
    }
}

impl Displayable for Connection {
    type Row = ConnectionDisplay;
}

impl Displayable for Channel {
    type Row = ChannelDisplay;
}

impl Displayable for Exchange {
    type Row = ExchangeDisplay;
}

impl Displayable for Queue {
    type Row = QueueDisplay;
}

impl Displayable for Binding {
    type Row = BindingDisplay;
}

impl Displayable for AuditRecord {
    type Row = AuditDisplay;
}
