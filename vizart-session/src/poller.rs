//! Status poller
//!
//! Converts a single job id into a sequence of status snapshots delivered
//! at a bounded cadence. One tokio task owns the timer for the job; the
//! task stops itself on a terminal snapshot, when the sink tells it to,
//! or after too many consecutive transport failures.
//!
//! Calls never overlap: the loop awaits each `get_status` before the next
//! tick, and a tick that fires while a call is still in flight is skipped
//! rather than queued.

use std::sync::Arc;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use vizart_client::{ClientError, JobTransport};
use vizart_core::dto::job::JobSnapshot;

use crate::config::SessionConfig;

/// Tells the poll loop whether to keep going after a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollControl {
    Continue,
    Stop,
}

/// Receiver side of the poll loop
///
/// Every callback carries the generation the poller was started with, so
/// the receiver can recognize and drop results that became stale after a
/// cancel or reset.
pub(crate) trait SnapshotSink: Send + Sync {
    /// A snapshot was fetched; returns whether polling should continue
    fn on_snapshot(&self, generation: u64, snapshot: JobSnapshot) -> PollControl;

    /// A single poll attempt failed; polling continues
    fn on_poll_error(&self, generation: u64, error: &ClientError);

    /// The consecutive-failure threshold was exceeded; polling stopped
    fn on_poll_exhausted(&self, generation: u64, error: ClientError);
}

/// Handle to a running poll task
///
/// Aborts the task on `stop()` and on drop, so an orphaned handle never
/// leaks a timer.
#[derive(Debug)]
pub(crate) struct PollerHandle {
    task: tokio::task::JoinHandle<()>,
}

impl PollerHandle {
    /// Stops the poll loop immediately
    ///
    /// An already-dispatched `get_status` call is torn down with the
    /// task; its result is never delivered.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns the poll loop for one job
pub(crate) fn spawn_poller<T: JobTransport + 'static>(
    transport: Arc<T>,
    config: SessionConfig,
    job_id: String,
    generation: u64,
    sink: Arc<dyn SnapshotSink>,
) -> PollerHandle {
    let task = tokio::spawn(async move {
        let mut interval = time::interval(config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first interval tick completes immediately; consume it so
        // the first read happens one full interval after activation.
        interval.tick().await;

        let mut consecutive_failures: u32 = 0;

        loop {
            interval.tick().await;
            debug!("Polling status for job {}", job_id);

            match transport.get_status(&job_id).await {
                Ok(snapshot) => {
                    consecutive_failures = 0;
                    if sink.on_snapshot(generation, snapshot) == PollControl::Stop {
                        debug!("Poll loop for job {} stopping", job_id);
                        break;
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    warn!(
                        "Poll attempt for job {} failed ({}/{}): {}",
                        job_id, consecutive_failures, config.failure_threshold, e
                    );

                    if consecutive_failures >= config.failure_threshold {
                        sink.on_poll_exhausted(generation, e);
                        break;
                    }
                    sink.on_poll_error(generation, &e);
                }
            }
        }
    });

    PollerHandle { task }
}
