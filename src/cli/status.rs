//! Status command implementation

use colored::Colorize;

use crate::cache::CacheTtl;
use crate::cli::GlobalOptions;
use crate::client::ResourceType;
use crate::config::Config;
use crate::error::Result;

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "RabbitOp Configuration Status".bold());

    let config_path = Config::resolve_path(opts.config_ref())?;

    match Config::load_from(&config_path) {
        Ok(config) => {
            println!("Config file: {}", config_path.display().to_string().cyan());
            println!();

            let api_url = opts.api_url.as_deref().unwrap_or(&config.api_url);
            println!("{} Gateway: {}", "○".dimmed(), api_url.cyan());

            if opts.token.is_some() || config.token.is_some() {
                println!("{} API token configured", "✓".green());
            } else {
                println!("{} API token not configured", "✗".red());
                println!("  → Run 'rabbitop init' to configure");
            }

            match config.resolve_cluster(opts.cluster_ref()) {
                Ok(cluster) => println!("{} Cluster: {}", "✓".green(), cluster),
                Err(_) => {
                    println!("{} No default cluster set", "○".dimmed());
                    println!("  → Pass --cluster <ID> or set default_cluster");
                }
            }

            println!();
            print_cache_settings(&config, opts.no_cache);
        }
        Err(_) => {
            println!("{} Configuration not found", "✗".red());
            println!();
            println!(
                "Run {} to create a configuration file.",
                "rabbitop init".cyan()
            );
            println!();
        }
    }

    Ok(())
}

fn print_cache_settings(config: &Config, no_cache: bool) {
    if no_cache {
        println!("{} Cache disabled (--no-cache)", "⚠".yellow());
        return;
    }

    println!(
        "Cache: {} entries per resource, sweep every {}s",
        config.cache.max_size, config.cache.cleanup_interval_secs
    );
    let overrides = config.cache.ttl_overrides();
    for rt in ResourceType::ALL {
        let ttl = overrides
            .get(&rt)
            .copied()
            .unwrap_or_else(|| CacheTtl::for_type(rt));
        let source = if overrides.contains_key(&rt) {
            " (override)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {:<12} {:>4}s{}", rt.as_str(), ttl.as_secs(), source);
    }

    let refresh = &config.refresh;
    println!();
    println!(
        "Watch: stale after {}s, checked every {}s",
        refresh.stale_time_secs, refresh.stale_check_interval_secs
    );
    match refresh.auto_refresh() {
        Some(interval) => println!("  auto-refresh every {}s", interval.as_secs()),
        None => println!("  auto-refresh {}", "off".dimmed()),
    }
}
