//! Copiloto CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize the config directory
//! - `serve`   — Start the HTTP API server
//! - `status`  — Show resolved configuration
//! - `doctor`  — Diagnose configuration and database health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "copiloto",
    about = "Copiloto — backend para promotores fintech",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the bind host
        #[arg(long)]
        host: Option<String>,
    },

    /// Show resolved configuration
    Status,

    /// Diagnose configuration and database health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Serve { port, host } => commands::serve::run(port, host).await?,
        Commands::Status => commands::status::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
