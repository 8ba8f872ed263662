use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use docvault::cli::commands::{handle_delete, handle_ingest, handle_search, handle_status};
use docvault::cli::{Cli, Commands};
use docvault::models::Config;
use docvault::services::DocumentIndex;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Configuration is validated before any client handle exists; missing or
    // invalid settings fail here, not at first use.
    let config = Config::from_env()?;
    let index = DocumentIndex::from_config(&config)?;

    tokio::select! {
        result = run_command(cli.command, &config, &index, cli.json) => {
            result?;
        }
        _ = shutdown_signal() => {
            eprintln!("\nReceived shutdown signal, exiting...");
        }
    }

    Ok(())
}

async fn run_command(
    command: Commands,
    config: &Config,
    index: &DocumentIndex,
    json: bool,
) -> Result<()> {
    match command {
        Commands::Status => {
            handle_status(config, json).await?;
        }
        Commands::Ingest(args) => {
            handle_ingest(index, args, json).await?;
        }
        Commands::Search(args) => {
            handle_search(index, args, json).await?;
        }
        Commands::Delete(args) => {
            handle_delete(index, args, json).await?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
