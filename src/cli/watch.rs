//! Watch command: stale-while-revalidate listing with background refresh

use colored::Colorize;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{AggregateStats, CacheStatsAggregator};
use crate::cli::{BrokerResource, CommandContext, GlobalOptions, OutputFormat, WatchArgs};
use crate::client::{Binding, Channel, Connection, Exchange, Queue, ResourceParams};
use crate::error::Result;
use crate::models::{CacheStatsDisplay, Displayable};
use crate::output::{Formattable, PageMeta, PagedRows, json, table};
use crate::refresh::{StaleWhileRevalidate, SwrState};

/// Run the watch command until Ctrl-C
pub async fn run(opts: &GlobalOptions, args: &WatchArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let params = args.filter.to_params(&args.pagination, ctx.page_size());

    match args.resource {
        BrokerResource::Connections => watch::<Connection>(&ctx, params, args).await,
        BrokerResource::Channels => watch::<Channel>(&ctx, params, args).await,
        BrokerResource::Exchanges => watch::<Exchange>(&ctx, params, args).await,
        BrokerResource::Queues => watch::<Queue>(&ctx, params, args).await,
        BrokerResource::Bindings => watch::<Binding>(&ctx, params, args).await,
    }
}

async fn watch<R>(ctx: &CommandContext, params: ResourceParams, args: &WatchArgs) -> Result<()>
where
    R: Displayable<Params = ResourceParams>,
{
    let refresh = &ctx.config.refresh;
    let swr = StaleWhileRevalidate::<R, _>::new(
        ctx.fetcher.clone(),
        &ctx.registry,
        ctx.cluster.clone(),
        params,
        refresh.stale_time(),
    );

    let sweep = ctx.registry.spawn_cleanup(ctx.config.cache.cleanup_interval());
    let stats = args.stats.then(|| {
        let aggregator = Arc::new(CacheStatsAggregator::new(ctx.registry.clone()));
        aggregator.start(refresh.stats_interval());
        aggregator
    });

    let mut rx = swr.subscribe();
    swr.fetch(false).await;

    let initial = rx.borrow_and_update().clone();
    if initial.data.is_none()
        && let Some(err) = initial.error.clone()
    {
        swr.teardown();
        return Err(err.into());
    }

    swr.start_stale_check(refresh.stale_check_interval());
    let interval = args
        .interval
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .or_else(|| refresh.auto_refresh());
    if let Some(interval) = interval {
        swr.start_auto_refresh(interval);
    }

    let view = WatchView {
        cluster: &ctx.cluster,
        format: ctx.format,
        interval,
    };
    view.render(&initial, stats.as_ref().map(|s| s.snapshot()).as_ref())?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                if state.loading {
                    continue;
                }
                view.render(&state, stats.as_ref().map(|s| s.snapshot()).as_ref())?;
            }
        }
    }

    swr.teardown();
    sweep.cancel();
    if let Some(stats) = stats {
        stats.stop();
    }
    Ok(())
}

struct WatchView<'a> {
    cluster: &'a str,
    format: OutputFormat,
    interval: Option<Duration>,
}

impl WatchView<'_> {
    fn render<R: Displayable>(&self, state: &SwrState<R>, stats: Option<&AggregateStats>) -> Result<()> {
        let Some(ref page) = state.data else {
            if let Some(ref err) = state.error {
                eprintln!("{} {}", "✗".red(), err);
            }
            return Ok(());
        };
        let rows = R::rows(&page.items);
        let meta = PageMeta {
            page: page.page,
            page_size: page.page_size,
            total_items: page.total_items,
            total_pages: page.total_pages,
            from_cache: state.from_cache,
        };

        match self.format {
            OutputFormat::Json => {
                println!("{}", json::format_json_paged(&rows, meta)?);
            }
            OutputFormat::Table => {
                println!("{}", table::format_table(&rows));
            }
            OutputFormat::Pretty => {
                if std::io::stdout().is_terminal() {
                    // Clear screen and home the cursor
                    print!("\x1B[2J\x1B[H");
                }
                println!("{}\n", self.header::<R>(state));
                PagedRows { rows: &rows, meta }.print(self.format)?;
                if let Some(ref err) = state.error {
                    println!("\n{} {}", "✗".red(), err);
                    println!("  → {}", err.suggested_action());
                }
                if let Some(stats) = stats {
                    println!();
                    CacheStatsDisplay::rows(stats).print(OutputFormat::Table)?;
                }
            }
        }
        Ok(())
    }

    fn header<R: Displayable>(&self, state: &SwrState<R>) -> String {
        let freshness = if state.is_stale {
            "stale".yellow().to_string()
        } else {
            "fresh".green().to_string()
        };
        let refresh = match self.interval {
            Some(interval) => format!("every {}s", interval.as_secs()),
            None => "manual".to_string(),
        };
        format!(
            "{} @ {}  [{}]  refresh: {}  {}",
            R::TYPE.to_string().bold(),
            self.cluster.cyan(),
            freshness,
            refresh,
            "(Ctrl-C to exit)".dimmed()
        )
    }
}
