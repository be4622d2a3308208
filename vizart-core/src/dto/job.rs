//! Wire envelopes and snapshots for the job endpoints

use serde::{Deserialize, Serialize};

use crate::domain::job::{JobStatus, JobType, ProcessingResult};

/// Response to a try-on/try-off submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub job_id: String,
    #[serde(default)]
    pub message: String,
    /// Free-form hint like "30-60 seconds"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
}

/// A point-in-time read of a job's state
///
/// `progress` is a float on the wire (the backend stores it as one); the
/// state machine converts it to the 0-100 integer scale when applied.
/// `result` is never present in the raw status response; the transport
/// attaches it after fetching the result endpoint for completed jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: String,
    pub job_type: JobType,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ProcessingResult>,
}

impl JobSnapshot {
    /// Progress clamped onto the 0-100 integer scale
    pub fn progress_percent(&self) -> u8 {
        self.progress.clamp(0.0, 100.0).round() as u8
    }
}

/// Envelope around the status endpoint's job object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEnvelope {
    pub success: bool,
    pub job: JobSnapshot,
}

/// Envelope around the result endpoint's payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub success: bool,
    pub job_id: String,
    pub result: ProcessingResult,
}

/// Response to a cancellation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
