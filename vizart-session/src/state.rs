//! Job state machine
//!
//! The authoritative in-memory representation of the one active job and
//! its transitions. Pure synchronous type: it consumes status snapshots
//! and caller events, performs no I/O, and is driven entirely by the
//! orchestrator under its lock.
//!
//! Lifecycle: `Idle -> Submitting -> Active -> Terminal`, with
//! `Cancelled` reachable from `Submitting` or `Active`. Once `Terminal`
//! or `Cancelled` is reached no snapshot may mutate the job; `reset`
//! returns to `Idle` from anywhere.

use vizart_core::domain::job::{Job, JobStatus};
use vizart_core::dto::job::JobSnapshot;

use crate::error::SessionError;

/// Coarse lifecycle phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No job; ready for a new submission
    Idle,
    /// Submission in flight, no job id yet
    Submitting,
    /// Job accepted by the backend and being polled
    Active,
    /// Job finished (completed, failed, or polling gave up)
    Terminal,
    /// Job cancelled by the caller
    Cancelled,
}

impl Phase {
    /// Whether the phase admits no further snapshots
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Terminal | Self::Cancelled)
    }
}

/// Read model published to observers on every transition
#[derive(Debug, Clone)]
pub struct JobView {
    pub phase: Phase,
    /// The tracked job, absent in `Idle` and `Submitting`
    pub job: Option<Job>,
    /// Last error surfaced by the session, if any
    pub error: Option<SessionError>,
}

impl JobView {
    pub(crate) fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            job: None,
            error: None,
        }
    }

    /// Progress of the tracked job, 0 when there is none
    pub fn progress(&self) -> u8 {
        self.job.as_ref().map(|job| job.progress).unwrap_or(0)
    }
}

/// What applying a snapshot did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SnapshotOutcome {
    /// Job updated, still live
    Applied,
    /// Job reached a terminal status
    Settled,
    /// Snapshot not applicable in the current phase; dropped
    Ignored,
}

/// What a cancel request did
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CancelOutcome {
    /// Nothing to cancel
    NotActive,
    /// Session cancelled; carries the job id to cancel server-side,
    /// absent when the submission had not returned an id yet
    Cancelled(Option<String>),
}

/// State machine for the single tracked job
#[derive(Debug)]
pub(crate) struct JobState {
    phase: Phase,
    job: Option<Job>,
    error: Option<SessionError>,
}

impl JobState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            job: None,
            error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Snapshot of the machine for observers
    pub fn view(&self) -> JobView {
        JobView {
            phase: self.phase,
            job: self.job.clone(),
            error: self.error.clone(),
        }
    }

    /// `Idle --submit--> Submitting`; rejects when a job is in progress
    pub fn begin_submit(&mut self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Submitting | Phase::Active => Err(SessionError::Busy),
            Phase::Idle | Phase::Terminal | Phase::Cancelled => {
                self.phase = Phase::Submitting;
                self.job = None;
                self.error = None;
                Ok(())
            }
        }
    }

    /// `Submitting --success--> Active`
    pub fn submit_succeeded(&mut self, job: Job) {
        debug_assert_eq!(self.phase, Phase::Submitting);
        self.phase = Phase::Active;
        self.job = Some(job);
        self.error = None;
    }

    /// `Submitting --failure--> Idle`, error attached, no job retained
    pub fn submit_failed(&mut self, error: SessionError) {
        self.phase = Phase::Idle;
        self.job = None;
        self.error = Some(error);
    }

    /// Applies a polled snapshot to the tracked job
    ///
    /// Progress is clamped to be non-decreasing; the message is replaced
    /// wholesale. A terminal status freezes the job, stamps
    /// `completed_at` once, and attaches the result or failure reason.
    /// Snapshots arriving outside `Active`, or for a different job id,
    /// are ignored.
    pub fn apply_snapshot(&mut self, snapshot: JobSnapshot) -> SnapshotOutcome {
        if self.phase != Phase::Active {
            return SnapshotOutcome::Ignored;
        }
        let Some(job) = self.job.as_mut() else {
            return SnapshotOutcome::Ignored;
        };
        if job.id != snapshot.id {
            return SnapshotOutcome::Ignored;
        }

        job.status = snapshot.status;
        job.progress = job.progress.max(snapshot.progress_percent());
        job.message = snapshot.message;
        self.error = None;

        match snapshot.status {
            JobStatus::Completed => {
                job.completed_at = snapshot.completed_at.or_else(|| Some(chrono::Utc::now()));
                job.result = snapshot.result;
                self.phase = Phase::Terminal;
                SnapshotOutcome::Settled
            }
            JobStatus::Failed => {
                job.completed_at = snapshot.completed_at.or_else(|| Some(chrono::Utc::now()));
                job.error_message = snapshot.error_message.clone();
                self.error = Some(SessionError::Server(
                    snapshot
                        .error_message
                        .unwrap_or_else(|| "processing failed".to_string()),
                ));
                self.phase = Phase::Terminal;
                SnapshotOutcome::Settled
            }
            // The backend can only report cancelled if the job was
            // cancelled out-of-band; treat it like a local cancel.
            JobStatus::Cancelled => {
                self.phase = Phase::Cancelled;
                SnapshotOutcome::Settled
            }
            JobStatus::Pending | JobStatus::Processing => SnapshotOutcome::Applied,
        }
    }

    /// Records a non-fatal poll failure; the job stays live
    pub fn poll_error(&mut self, error: SessionError) {
        if self.phase == Phase::Active {
            self.error = Some(error);
        }
    }

    /// Parks the job in `Terminal` after polling gave up on it
    ///
    /// The job is frozen at its last observed state; `reset` returns the
    /// session to `Idle`.
    pub fn poll_exhausted(&mut self, error: SessionError) {
        if self.phase == Phase::Active {
            self.phase = Phase::Terminal;
            self.error = Some(error);
        }
    }

    /// `Submitting|Active --cancel--> Cancelled`
    ///
    /// Local state is forced regardless of whether the network cancel
    /// ever succeeds.
    pub fn cancel(&mut self) -> CancelOutcome {
        match self.phase {
            Phase::Submitting => {
                self.phase = Phase::Cancelled;
                CancelOutcome::Cancelled(None)
            }
            Phase::Active => {
                let job_id = self.job.as_ref().map(|job| job.id.clone());
                if let Some(job) = self.job.as_mut() {
                    job.status = JobStatus::Cancelled;
                }
                self.phase = Phase::Cancelled;
                CancelOutcome::Cancelled(job_id)
            }
            Phase::Idle | Phase::Terminal | Phase::Cancelled => CancelOutcome::NotActive,
        }
    }

    /// Forces `Idle` from any state, discarding the job and error
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
