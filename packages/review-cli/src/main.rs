//! Review insight CLI
//!
//! Walks a seller description and its customer reviews through extraction,
//! matching and categorization on the analysis backend.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cmd;
mod config;
mod render;

use config::Config;

#[derive(Parser)]
#[command(name = "review")]
#[command(about = "Compare seller claims against customer reviews")]
#[command(version)]
struct Cli {
    /// Analysis backend base URL (overrides REVIEW_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory for exported artifacts (overrides REVIEW_EXPORT_DIR)
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Guided menu (default)
    Interactive,

    /// Configure, start a session and run every step in order
    Run(cmd::run::RunArgs),

    /// Run the whole analysis in one backend call
    Pipeline(cmd::InputArgs),

    /// Configure the API key and check the backend is alive
    Heartbeat,

    /// Switch the backend between sequential and parallel processing
    ToggleWorkers,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for reports
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,review_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()
        .context("Failed to load configuration")?
        .with_overrides(cli.api_url, cli.export_dir)?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => cmd::interactive::run(&config).await,
        Commands::Run(args) => cmd::run::run(&config, &args).await,
        Commands::Pipeline(args) => cmd::server::pipeline(&config, &args).await,
        Commands::Heartbeat => cmd::server::heartbeat(&config).await,
        Commands::ToggleWorkers => cmd::server::toggle_workers(&config).await,
    }
}
