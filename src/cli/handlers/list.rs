//! Generic list command handler
//!
//! Every list command follows the same flow:
//! 1. Load the requested page through the resource controller
//! 2. Optionally fetch the remaining pages concurrently
//! 3. Apply limit
//! 4. Convert to display rows and print

use std::sync::Arc;

use log::debug;

use crate::cli::{CommandContext, PaginationArgs};
use crate::client::{PageSelect, fetch_remaining_pages};
use crate::error::Result;
use crate::models::Displayable;
use crate::output::{Formattable, PageMeta, PagedRows, progress};

/// Page requests in flight at once for `--all`
const MAX_CONCURRENT_PAGES: usize = 4;

/// Run a standard list command for resource `R`.
///
/// # Example
///
/// ```ignore
/// let params = filter.to_params(&pagination, ctx.page_size());
/// run_list_command::<Queue>(&ctx, params, &pagination, all).await
/// ```
pub async fn run_list_command<R: Displayable>(
    ctx: &CommandContext,
    params: R::Params,
    pagination: &PaginationArgs,
    all: bool,
) -> Result<()> {
    let controller = ctx.controller::<R>();
    debug!("Listing {} for cluster {} ({:?})", R::TYPE, ctx.cluster, params);

    let spinner = progress::spinner(ctx.format, format!("Loading {}...", R::TYPE));
    let first = controller.load(&ctx.cluster, params.clone()).await;
    progress::finish(spinner);
    let first = first?;
    let from_cache = controller.snapshot().from_cache;

    let mut items = first.items.clone();
    if all && first.has_next {
        let remaining = first.remaining_pages();
        debug!("Fetching {} more pages of {}", remaining.len(), R::TYPE);

        let controller = Arc::clone(&controller);
        let cluster = ctx.cluster.clone();
        let rest = fetch_remaining_pages(
            remaining,
            move |page| {
                let controller = Arc::clone(&controller);
                let cluster = cluster.clone();
                let params = params.at_page(page);
                async move {
                    controller
                        .fetch_page(&cluster, &params)
                        .await
                        .map(|p| p.items)
                }
            },
            MAX_CONCURRENT_PAGES,
        )
        .await?;
        items.extend(rest);
    }

    debug!("Fetched {} {}", items.len(), R::TYPE);

    // Apply limit if specified
    if let Some(limit) = pagination.limit {
        items.truncate(limit);
    }

    let rows = R::rows(&items);
    if all {
        rows.print(ctx.format)?;
    } else {
        PagedRows {
            rows: &rows,
            meta: PageMeta {
                page: first.page,
                page_size: first.page_size,
                total_items: first.total_items,
                total_pages: first.total_pages,
                from_cache,
            },
        }
        .print(ctx.format)?;
    }

    Ok(())
}
