//! Transport seam for the session layer
//!
//! The orchestrator depends on this trait rather than on a concrete HTTP
//! client, so tests can drive it with a scripted transport and production
//! code plugs in [`VizartClient`].

use async_trait::async_trait;

use crate::VizartClient;
use crate::error::Result;
use vizart_core::dto::job::JobSnapshot;
use vizart_core::dto::request::ProcessingRequest;

/// The three network operations job orchestration depends on
///
/// Implementations perform exactly one logical exchange per call and do
/// not retry; retry policy lives in the polling layer.
#[async_trait]
pub trait JobTransport: Send + Sync {
    /// Transmit a submission and return the backend-assigned job id
    async fn submit(&self, request: ProcessingRequest) -> Result<String>;

    /// Read the current snapshot of a job
    ///
    /// Idempotent and side-effect-free; may be called arbitrarily often.
    async fn get_status(&self, job_id: &str) -> Result<JobSnapshot>;

    /// Best-effort cancellation of a job
    ///
    /// A job the server has already finished is not an error.
    async fn cancel(&self, job_id: &str) -> Result<()>;
}

#[async_trait]
impl JobTransport for VizartClient {
    async fn submit(&self, request: ProcessingRequest) -> Result<String> {
        match request {
            ProcessingRequest::TryOn {
                model_image,
                garment_image,
                options,
            } => self.submit_try_on(model_image, garment_image, options).await,
            ProcessingRequest::TryOff {
                model_image,
                options,
            } => self.submit_try_off(model_image, options).await,
        }
    }

    async fn get_status(&self, job_id: &str) -> Result<JobSnapshot> {
        self.get_job_status(job_id).await
    }

    async fn cancel(&self, job_id: &str) -> Result<()> {
        self.cancel_job(job_id).await
    }
}
