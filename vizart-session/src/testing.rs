//! Test support: a scripted transport and snapshot fixtures

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use vizart_client::{ClientError, JobTransport, Result};
use vizart_core::domain::job::{JobStatus, JobType, ProcessingResult};
use vizart_core::dto::job::JobSnapshot;
use vizart_core::dto::request::ProcessingRequest;

/// Transport whose responses are scripted ahead of time
///
/// Each queue is consumed front to back; an exhausted status queue keeps
/// serving `repeat_status` when one is set, and a 404 otherwise. An
/// optional artificial delay simulates slow in-flight calls under the
/// paused test clock.
pub(crate) struct MockTransport {
    submit_results: Mutex<VecDeque<Result<String>>>,
    status_results: Mutex<VecDeque<Result<JobSnapshot>>>,
    repeat_status: Mutex<Option<JobSnapshot>>,
    cancelled: Mutex<Vec<String>>,
    submit_delay: Mutex<Option<Duration>>,
    status_delay: Mutex<Option<Duration>>,
    status_call_count: AtomicU32,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            submit_results: Mutex::new(VecDeque::new()),
            status_results: Mutex::new(VecDeque::new()),
            repeat_status: Mutex::new(None),
            cancelled: Mutex::new(Vec::new()),
            submit_delay: Mutex::new(None),
            status_delay: Mutex::new(None),
            status_call_count: AtomicU32::new(0),
        }
    }

    pub fn push_submit(&self, result: Result<String>) {
        self.submit_results.lock().unwrap().push_back(result);
    }

    pub fn push_status(&self, result: Result<JobSnapshot>) {
        self.status_results.lock().unwrap().push_back(result);
    }

    /// Snapshot served once the scripted queue runs dry
    pub fn set_repeat_status(&self, snapshot: JobSnapshot) {
        *self.repeat_status.lock().unwrap() = Some(snapshot);
    }

    pub fn set_submit_delay(&self, delay: Duration) {
        *self.submit_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_status_delay(&self, delay: Duration) {
        *self.status_delay.lock().unwrap() = Some(delay);
    }

    pub fn status_calls(&self) -> u32 {
        self.status_call_count.load(Ordering::SeqCst)
    }

    /// Job ids the orchestrator asked the backend to cancel
    pub fn cancelled_jobs(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobTransport for MockTransport {
    async fn submit(&self, _request: ProcessingRequest) -> Result<String> {
        let delay = *self.submit_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.submit_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::api_error(500, "no scripted submit")))
    }

    async fn get_status(&self, job_id: &str) -> Result<JobSnapshot> {
        self.status_call_count.fetch_add(1, Ordering::SeqCst);
        let delay = *self.status_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.status_results.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => match self.repeat_status.lock().unwrap().clone() {
                Some(snapshot) => Ok(snapshot),
                None => Err(ClientError::api_error(404, format!("no such job: {job_id}"))),
            },
        }
    }

    async fn cancel(&self, job_id: &str) -> Result<()> {
        self.cancelled.lock().unwrap().push(job_id.to_string());
        Ok(())
    }
}

pub(crate) fn processing_snapshot(id: &str, progress: f64) -> JobSnapshot {
    JobSnapshot {
        id: id.to_string(),
        job_type: JobType::TryOn,
        status: JobStatus::Processing,
        progress,
        message: "Fitting garment...".to_string(),
        created_at: None,
        completed_at: None,
        processing_time: None,
        error_message: None,
        result: None,
    }
}

pub(crate) fn completed_snapshot(id: &str, image_url: &str) -> JobSnapshot {
    JobSnapshot {
        status: JobStatus::Completed,
        progress: 100.0,
        message: "Done".to_string(),
        result: Some(ProcessingResult::TryOn {
            result_image_url: image_url.to_string(),
            processing_time: Some(42.0),
            metadata: None,
        }),
        ..processing_snapshot(id, 100.0)
    }
}

pub(crate) fn failed_snapshot(id: &str, reason: &str) -> JobSnapshot {
    JobSnapshot {
        status: JobStatus::Failed,
        error_message: Some(reason.to_string()),
        ..processing_snapshot(id, 60.0)
    }
}
