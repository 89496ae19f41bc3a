//! Audit trail command

use crate::cli::handlers::run_list_command;
use crate::cli::{AuditArgs, CommandContext, GlobalOptions};
use crate::client::AuditRecord;
use crate::error::Result;

/// Run the audit command for the resolved cluster
pub async fn run(opts: &GlobalOptions, args: &AuditArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let params = args.filter.to_params(&args.pagination, ctx.page_size());
    run_list_command::<AuditRecord>(&ctx, params, &args.pagination, args.all).await
}
