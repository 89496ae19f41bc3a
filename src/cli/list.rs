//! List command implementation

use crate::cli::handlers::run_list_command;
use crate::cli::{BrokerResource, CommandContext, GlobalOptions, ListArgs};
use crate::client::{Binding, Channel, Connection, Exchange, Queue};
use crate::error::Result;

/// Run the list command for one broker resource type
pub async fn run(opts: &GlobalOptions, args: &ListArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let params = args.filter.to_params(&args.pagination, ctx.page_size());
    let pagination = &args.pagination;

    match args.resource {
        BrokerResource::Connections => {
            run_list_command::<Connection>(&ctx, params, pagination, args.all).await
        }
        BrokerResource::Channels => {
            run_list_command::<Channel>(&ctx, params, pagination, args.all).await
        }
        BrokerResource::Exchanges => {
            run_list_command::<Exchange>(&ctx, params, pagination, args.all).await
        }
        BrokerResource::Queues => run_list_command::<Queue>(&ctx, params, pagination, args.all).await,
        BrokerResource::Bindings => {
            run_list_command::<Binding>(&ctx, params, pagination, args.all).await
        }
    }
}
