//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod process;

pub use process::{TryOffArgs, TryOnArgs};

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Put a garment on a model and watch the job to completion
    TryOn(TryOnArgs),
    /// Extract garments from a model photo and watch the job to completion
    TryOff(TryOffArgs),
    /// Show the current status of a job
    Status {
        /// Job id
        id: String,
    },
    /// Cancel a job
    Cancel {
        /// Job id
        id: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::TryOn(args) => process::handle_try_on(args, config).await,
        Commands::TryOff(args) => process::handle_try_off(args, config).await,
        Commands::Status { id } => job::show_status(&id, config).await,
        Commands::Cancel { id } => job::cancel(&id, config).await,
    }
}
