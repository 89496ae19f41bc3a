//! Filter argument types for CLI commands

use clap::Args;

use super::PaginationArgs;
use crate::client::{AuditFilterParams, ResourceParams};

/// Name filter for broker resource listings.
#[derive(Args, Debug, Default, Clone)]
pub struct ResourceFilterArgs {
    /// Filter by name (substring, or a pattern with --regex)
    #[arg(long)]
    pub name: Option<String>,

    /// Treat --name as a regular expression
    #[arg(long, requires = "name")]
    pub regex: bool,
}

impl ResourceFilterArgs {
    pub fn to_params(&self, pagination: &PaginationArgs, default_page_size: usize) -> ResourceParams {
        let (page, page_size) = pagination.resolve(default_page_size);
        let mut params = ResourceParams::new().page(page).page_size(page_size);
        if let Some(ref name) = self.name {
            params = params.name(name).regex(self.regex);
        }
        params
    }
}

/// Filter arguments for the audit command.
#[derive(Args, Debug, Default, Clone)]
pub struct AuditFilterArgs {
    /// Filter by acting user
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    /// Filter by operation type (e.g. PURGE_QUEUE)
    #[arg(long)]
    pub operation: Option<String>,

    /// Filter by outcome (SUCCESS, FAILURE)
    #[arg(long)]
    pub status: Option<String>,
}

impl AuditFilterArgs {
    pub fn to_params(
        &self,
        pagination: &PaginationArgs,
        default_page_size: usize,
    ) -> AuditFilterParams {
        let (page, page_size) = pagination.resolve(default_page_size);
        let mut params = AuditFilterParams::new().page(page).page_size(page_size);
        if let Some(ref user) = self.user {
            params = params.username(user);
        }
        if let Some(ref operation) = self.operation {
            params = params.operation(operation.to_uppercase());
        }
        if let Some(ref status) = self.status {
            params = params.status(status.to_uppercase());
        }
        params
    }
}
