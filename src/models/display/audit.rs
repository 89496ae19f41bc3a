//! Audit log display model

use serde::Serialize;
use tabled::Tabled;

use super::common::{DASH, format_as_iso_datetime, or_dash};
use crate::client::AuditRecord;

/// Audit log display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct AuditDisplay {
    /// When the action occurred
    #[tabled(rename = "TIMESTAMP")]
    pub timestamp: String,

    #[tabled(rename = "USER")]
    pub user: String,

    #[tabled(rename = "OPERATION")]
    pub operation: String,

    /// `type/name` of the affected resource
    #[tabled(rename = "RESOURCE")]
    pub resource: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    /// Error message for failed operations
    #[tabled(rename = "DETAILS")]
    pub details: String,
}

impl From<&AuditRecord> for AuditDisplay {
    fn from(record: &AuditRecord) -> Self {
        let resource = match (&record.resource_type, &record.resource_name) {
            (Some(kind), Some(name)) => format!("{}/{}", kind.to_lowercase(), name),
            (None, Some(name)) => name.clone(),
            (Some(kind), None) => kind.to_lowercase(),
            (None, None) => DASH.to_string(),
        };

        Self {
            timestamp: format_as_iso_datetime(&record.timestamp),
            user: or_dash(Some(&record.username)),
            operation: record.operation.clone(),
            resource,
            status: record.status.clone(),
            details: or_dash(record.error_message.as_deref()),
        }
    }
}
