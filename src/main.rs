mod cli;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Commands};
use ledgerd::config::Config;
use ledgerd::{api, commands};
use tracing_subscriber::EnvFilter;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AnyError> {
    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Start(args) => api::run(config, args.address).await?,
        Commands::Unjoin(args) => commands::unjoin(&config, args.channel_id.as_deref())?,
        Commands::UpdateStatus(args) => {
            let change = commands::update_status(&config, args.channel.channel_id.as_deref(), args.status)?;
            println!("{change:?}");
        }
        Commands::List => {
            for ledger_id in commands::list(&config)? {
                println!("{ledger_id}");
            }
        }
    }

    Ok(())
}
