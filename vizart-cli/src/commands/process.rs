//! Submission command handlers
//!
//! Submits try-on/try-off jobs through the session orchestrator and
//! renders live progress until the job settles. Ctrl-C cancels the job
//! instead of abandoning it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use vizart_client::VizartClient;
use vizart_core::domain::job::{GarmentType, JobStatus, ProcessingResult};
use vizart_core::dto::request::{ImagePayload, TryOffOptions, TryOnOptions};
use vizart_session::{JobView, Phase, ProcessingOrchestrator};

use crate::config::Config;

/// Arguments for the try-on command
#[derive(Args)]
pub struct TryOnArgs {
    /// Path to the model photo
    #[arg(long)]
    model: PathBuf,

    /// Path to the garment photo
    #[arg(long)]
    garment: PathBuf,

    /// Keep the model photo's original background
    #[arg(long)]
    preserve_background: bool,

    /// Do not rescale the garment to fit the model
    #[arg(long)]
    no_adjust_size: bool,

    /// Where the garment sits on the body (upper, lower, full)
    #[arg(long, value_parser = parse_garment_type)]
    garment_type: Option<GarmentType>,
}

/// Arguments for the try-off command
#[derive(Args)]
pub struct TryOffArgs {
    /// Path to the model photo
    #[arg(long)]
    model: PathBuf,

    /// Only extract the most confident garment
    #[arg(long)]
    single: bool,

    /// Garment classifications to keep (upper, lower, full)
    #[arg(long, value_parser = parse_garment_type, value_delimiter = ',')]
    garment_types: Vec<GarmentType>,

    /// Image format for the extracted garments
    #[arg(long, default_value = "png")]
    output_format: String,
}

fn parse_garment_type(value: &str) -> std::result::Result<GarmentType, String> {
    match value {
        "upper" => Ok(GarmentType::Upper),
        "lower" => Ok(GarmentType::Lower),
        "full" => Ok(GarmentType::Full),
        other => Err(format!("unknown garment type: {other}")),
    }
}

/// Handle the try-on command
pub async fn handle_try_on(args: TryOnArgs, config: &Config) -> Result<()> {
    let model = read_image(&args.model)?;
    let garment = read_image(&args.garment)?;

    let options = TryOnOptions {
        preserve_background: args.preserve_background,
        adjust_size: !args.no_adjust_size,
        garment_type: args.garment_type,
    };

    let orchestrator = orchestrator(config);
    let updates = orchestrator.subscribe();

    let job_id = orchestrator
        .start_try_on(model, garment, Some(options))
        .await?;
    println!("Submitted try-on job {}", job_id.bold());

    watch_until_settled(&orchestrator, updates).await
}

/// Handle the try-off command
pub async fn handle_try_off(args: TryOffArgs, config: &Config) -> Result<()> {
    let model = read_image(&args.model)?;

    let defaults = TryOffOptions::default();
    let options = TryOffOptions {
        extract_all: !args.single,
        garment_types: if args.garment_types.is_empty() {
            defaults.garment_types
        } else {
            args.garment_types
        },
        output_format: args.output_format,
    };

    let orchestrator = orchestrator(config);
    let updates = orchestrator.subscribe();

    let job_id = orchestrator.start_try_off(model, Some(options)).await?;
    println!("Submitted try-off job {}", job_id.bold());

    watch_until_settled(&orchestrator, updates).await
}

fn orchestrator(config: &Config) -> ProcessingOrchestrator<VizartClient> {
    let client = VizartClient::new(&config.backend_url);
    ProcessingOrchestrator::new(client, config.session.clone())
}

fn read_image(path: &Path) -> Result<ImagePayload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(ImagePayload::new(file_name, bytes))
}

/// Render progress updates until the job settles; Ctrl-C cancels
async fn watch_until_settled(
    orchestrator: &ProcessingOrchestrator<VizartClient>,
    mut updates: tokio::sync::watch::Receiver<JobView>,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\n{}", "Cancelling...".yellow());
                orchestrator.cancel();
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = updates.borrow_and_update().clone();
                print_progress(&view);
                if view.phase.is_settled() {
                    print_outcome(&view);
                    break;
                }
            }
        }
    }
    Ok(())
}

fn print_progress(view: &JobView) {
    if let Some(job) = &view.job {
        let message = if job.message.is_empty() {
            "Working..."
        } else {
            &job.message
        };
        println!("  {:>3}%  {}", view.progress(), message.dimmed());
    }
}

fn print_outcome(view: &JobView) {
    match view.phase {
        Phase::Cancelled => println!("{}", "Job cancelled.".yellow()),
        Phase::Terminal => match &view.job {
            Some(job) if job.status == JobStatus::Completed => {
                println!("{}", "Job completed.".green().bold());
                if let Some(result) = &job.result {
                    print_result(result);
                }
            }
            Some(job) if job.status == JobStatus::Failed => {
                let reason = job.error_message.as_deref().unwrap_or("unknown reason");
                println!("{} {}", "Job failed:".red().bold(), reason);
            }
            _ => {
                if let Some(error) = &view.error {
                    println!("{} {}", "Polling gave up:".red().bold(), error);
                }
            }
        },
        _ => {}
    }
}

fn print_result(result: &ProcessingResult) {
    match result {
        ProcessingResult::TryOn {
            result_image_url, ..
        } => {
            println!("  Result image: {}", result_image_url.cyan());
        }
        ProcessingResult::TryOff {
            extracted_garments, ..
        } => {
            println!("  Extracted {} garment(s):", extracted_garments.len());
            for garment in extracted_garments {
                let kind = format!("{:?}", garment.garment_type).to_lowercase();
                println!(
                    "    {:<6} {} (confidence {:.2})",
                    kind.bold(),
                    garment.image_url.cyan(),
                    garment.confidence
                );
            }
        }
    }
}
