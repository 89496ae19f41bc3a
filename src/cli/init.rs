//! Init command implementation

use colored::Colorize;
use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};

use crate::cli::GlobalOptions;
use crate::client::{Connection, GatewayClient, ResourceFetcher, ResourceParams};
use crate::config::Config;
use crate::error::Result;

/// Run the init command
///
/// Existing settings are kept as prompt defaults; cache and refresh tuning is
/// left untouched.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}", "Welcome to RabbitOp!".bold().green());
    println!("Let's connect to your RabbitMQ admin console.\n");

    let theme = ColorfulTheme::default();
    let mut config = Config::load_or_default(opts.config_ref()).unwrap_or_default();

    let api_url: String = Input::with_theme(&theme)
        .with_prompt("Gateway URL")
        .default(opts.api_url.clone().unwrap_or_else(|| config.api_url.clone()))
        .interact_text()?;

    let token: String = Password::with_theme(&theme)
        .with_prompt("API token")
        .interact()?;

    let cluster: String = Input::with_theme(&theme)
        .with_prompt("Default cluster ID (leave empty to always pass --cluster)")
        .default(
            opts.cluster
                .clone()
                .or_else(|| config.default_cluster.clone())
                .unwrap_or_default(),
        )
        .allow_empty(true)
        .interact_text()?;

    config.api_url = api_url;
    config.token = Some(token);
    config.default_cluster = (!cluster.is_empty()).then_some(cluster);

    if let Some(ref cluster) = config.default_cluster {
        println!("\n{}", "Checking access...".cyan());
        let client = GatewayClient::new(
            &config.api_url,
            config.token.clone(),
            config.request_timeout(),
        )?;
        let probe = ResourceParams::new().page_size(1);
        match client.fetch_page::<Connection>(cluster, &probe).await {
            Ok(_) => println!("{}", "✓ Gateway reachable and token accepted!".green()),
            Err(err) => {
                println!("{} {}", "⚠".yellow(), err);
                let keep = Confirm::with_theme(&theme)
                    .with_prompt("Save this configuration anyway?")
                    .default(true)
                    .interact()?;
                if !keep {
                    return Ok(());
                }
            }
        }
    }

    let config_path = Config::resolve_path(opts.config_ref())?;
    config.save_to(&config_path)?;

    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );
    if let Some(ref cluster) = config.default_cluster {
        println!("  Default cluster: {}", cluster.bold());
    }

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "rabbitop status".cyan());
    println!("  {} - List queues", "rabbitop list queues".cyan());
    println!("  {} - Follow connections live", "rabbitop watch connections".cyan());

    Ok(())
}
