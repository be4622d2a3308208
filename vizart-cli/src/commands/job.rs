//! Job command handlers
//!
//! One-shot status reads and cancellation for jobs submitted earlier.

use anyhow::Result;
use colored::*;

use vizart_client::VizartClient;
use vizart_core::domain::job::JobStatus;
use vizart_core::dto::job::JobSnapshot;

use crate::config::Config;

/// Show the current status of a job
pub async fn show_status(id: &str, config: &Config) -> Result<()> {
    let client = VizartClient::new(&config.backend_url);
    let snapshot = client.get_job_status(id).await?;
    print_snapshot(&snapshot);
    Ok(())
}

/// Cancel a job
pub async fn cancel(id: &str, config: &Config) -> Result<()> {
    let client = VizartClient::new(&config.backend_url);
    client.cancel_job(id).await?;
    println!("{}", format!("Cancel requested for job {}.", id).yellow());
    Ok(())
}

fn print_snapshot(snapshot: &JobSnapshot) {
    let status = match snapshot.status {
        JobStatus::Pending => "pending".yellow(),
        JobStatus::Processing => "processing".cyan(),
        JobStatus::Completed => "completed".green(),
        JobStatus::Failed => "failed".red(),
        JobStatus::Cancelled => "cancelled".yellow(),
    };

    println!("{}", format!("Job {}", snapshot.id).bold());
    println!("  Status:   {}", status);
    println!("  Progress: {}%", snapshot.progress_percent());
    if !snapshot.message.is_empty() {
        println!("  Message:  {}", snapshot.message);
    }
    if let Some(created_at) = snapshot.created_at {
        println!("  Created:  {}", created_at);
    }
    if let Some(completed_at) = snapshot.completed_at {
        println!("  Finished: {}", completed_at);
    }
    if let Some(error) = &snapshot.error_message {
        println!("  Error:    {}", error.red());
    }
    if let Some(result) = &snapshot.result {
        match serde_json::to_string_pretty(result) {
            Ok(rendered) => println!("  Result:\n{}", rendered),
            Err(_) => println!("  Result:   (unprintable)"),
        }
    }
}
