//! RabbitOp CLI - terminal companion for the RabbitMQ admin console

use clap::Parser;

use rabbitop::cli::{self, Cli, Commands, GlobalOptions};
use rabbitop::error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    // RUST_LOG wins over --debug
    let level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);
    log::debug!("Parsed command: {:?}", cli.command);

    match cli.command {
        Commands::Init => cli::init::run(&opts).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("rabbitop version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::List(ref args) => cli::list::run(&opts, args).await,
        Commands::Watch(ref args) => cli::watch::run(&opts, args).await,
        Commands::Audit(ref args) => cli::audit::run(&opts, args).await,
        Commands::Completion { shell } => {
            cli::completions::run(shell);
            Ok(())
        }
    }
}
