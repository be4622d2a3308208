//! Vizart Session
//!
//! Client-side orchestration of long-running image-processing jobs.
//!
//! A [`ProcessingOrchestrator`] owns one active-job slot: it submits a
//! try-on or try-off request through a [`vizart_client::JobTransport`],
//! polls the job's status at a configurable cadence, folds the snapshots
//! through an explicit state machine, and publishes an observable read
//! model. Cancellation is immediate locally and best-effort server-side;
//! stale network results arriving after a cancel or reset are dropped.
//!
//! # Example
//!
//! ```no_run
//! use vizart_client::VizartClient;
//! use vizart_core::dto::request::ImagePayload;
//! use vizart_session::{ProcessingOrchestrator, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = VizartClient::new("http://localhost:8000");
//!     let orchestrator = ProcessingOrchestrator::new(client, SessionConfig::from_env());
//!
//!     let mut updates = orchestrator.subscribe();
//!     let model = ImagePayload::new("model.jpg", std::fs::read("model.jpg")?);
//!     orchestrator.start_try_off(model, None).await?;
//!
//!     while updates.changed().await.is_ok() {
//!         let view = updates.borrow_and_update().clone();
//!         println!("{:?}: {}%", view.phase, view.progress());
//!         if view.phase.is_settled() {
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
mod orchestrator;
mod poller;
mod state;
#[cfg(test)]
mod testing;

pub use config::SessionConfig;
pub use error::SessionError;
pub use orchestrator::ProcessingOrchestrator;
pub use state::{JobView, Phase};
