//! Vizart CLI
//!
//! Command-line interface for the Vizart virtual try-on backend: submit
//! try-on and try-off jobs, watch their progress, and manage them.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use vizart_session::SessionConfig;

#[derive(Parser)]
#[command(name = "vizart")]
#[command(about = "Vizart virtual try-on CLI", long_about = None)]
struct Cli {
    /// Backend URL
    #[arg(long, env = "VIZART_URL", default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let session = SessionConfig::from_env();
    session.validate()?;

    let config = Config {
        backend_url: cli.url,
        session,
    };

    handle_command(cli.command, &config).await
}
