//! Job domain types

use serde::{Deserialize, Serialize};

/// One backend unit of asynchronous processing work, tracked by id.
///
/// The backend owns the authoritative record; this structure is the
/// client-side view, built from submission and status snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Opaque identifier assigned by the backend at submission
    pub id: String,
    pub job_type: JobType,
    pub status: JobStatus,
    /// 0-100, non-decreasing while the job is live
    pub progress: u8,
    /// Human-readable current-step description, replaced on each update
    pub message: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Present only once the job completed successfully
    pub result: Option<ProcessingResult>,
    /// Failure reason reported by the backend for failed jobs
    pub error_message: Option<String>,
}

impl Job {
    /// Creates the initial client-side record for a freshly submitted job
    pub fn submitted(id: String, job_type: JobType) -> Self {
        Self {
            id,
            job_type,
            status: JobStatus::Pending,
            progress: 0,
            message: String::new(),
            created_at: Some(chrono::Utc::now()),
            completed_at: None,
            result: None,
            error_message: None,
        }
    }
}

/// Job processing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Whether the status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Kind of processing requested for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "try-on")]
    TryOn,
    #[serde(rename = "try-off")]
    TryOff,
}

/// Garment classification used by both options and extraction results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentType {
    Upper,
    Lower,
    Full,
}

/// Result payload of a completed job
///
/// The backend returns one of two shapes depending on the job type; they
/// are distinguished by their required fields, not an explicit tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessingResult {
    TryOff {
        /// Garments extracted from the model image, in detection order
        extracted_garments: Vec<ExtractedGarment>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        processing_time: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    TryOn {
        /// URL of the rendered try-on image
        result_image_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        processing_time: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
}

/// One garment extracted by a try-off job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedGarment {
    #[serde(rename = "type")]
    pub garment_type: GarmentType,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_url: Option<String>,
    /// Detection confidence in [0, 1]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}
