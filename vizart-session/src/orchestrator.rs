//! Processing orchestrator
//!
//! The entry point combining transport, poller, and state machine into a
//! single-job session: `start_try_on` / `start_try_off`, `cancel`,
//! `reset`, and a continuously updated observable read model.
//!
//! One orchestrator owns exactly one active-job slot. All transport
//! awaits happen outside the state lock; a generation counter, bumped
//! under the lock on every start, cancel, and reset, tags in-flight work
//! so late results can be recognized as stale and dropped. Cancellation
//! therefore always wins over a late-arriving snapshot.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use vizart_client::{ClientError, JobTransport};
use vizart_core::domain::job::Job;
use vizart_core::dto::job::JobSnapshot;
use vizart_core::dto::request::{ImagePayload, ProcessingRequest, TryOffOptions, TryOnOptions};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::poller::{PollControl, PollerHandle, SnapshotSink, spawn_poller};
use crate::state::{CancelOutcome, JobState, JobView, SnapshotOutcome};

/// Client-side orchestrator for one image-processing job at a time
///
/// Cheap to clone; clones share the same session.
pub struct ProcessingOrchestrator<T: JobTransport + 'static> {
    inner: Arc<Inner<T>>,
}

impl<T: JobTransport + 'static> Clone for ProcessingOrchestrator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T: JobTransport + 'static> {
    transport: Arc<T>,
    config: SessionConfig,
    guarded: Mutex<Guarded>,
    watch_tx: watch::Sender<JobView>,
}

/// Everything mutated under the session lock
struct Guarded {
    machine: JobState,
    /// Epoch tag for in-flight work; bumped on start, cancel, and reset
    generation: u64,
    poller: Option<PollerHandle>,
}

impl<T: JobTransport + 'static> ProcessingOrchestrator<T> {
    /// Creates an orchestrator owning its transport
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Self::with_transport(Arc::new(transport), config)
    }

    /// Creates an orchestrator over a shared transport
    pub fn with_transport(transport: Arc<T>, config: SessionConfig) -> Self {
        let (watch_tx, _) = watch::channel(JobView::idle());
        Self {
            inner: Arc::new(Inner {
                transport,
                config,
                guarded: Mutex::new(Guarded {
                    machine: JobState::new(),
                    generation: 0,
                    poller: None,
                }),
                watch_tx,
            }),
        }
    }

    /// Registers an observer for read-model updates
    ///
    /// The receiver is notified synchronously on every state transition
    /// and always holds the latest view.
    pub fn subscribe(&self) -> watch::Receiver<JobView> {
        self.inner.watch_tx.subscribe()
    }

    /// The current read model
    pub fn current(&self) -> JobView {
        self.inner.watch_tx.borrow().clone()
    }

    /// Submits a try-on job and begins polling it
    pub async fn start_try_on(
        &self,
        model_image: ImagePayload,
        garment_image: ImagePayload,
        options: Option<TryOnOptions>,
    ) -> Result<String, SessionError> {
        self.start(ProcessingRequest::TryOn {
            model_image,
            garment_image,
            options,
        })
        .await
    }

    /// Submits a try-off job and begins polling it
    pub async fn start_try_off(
        &self,
        model_image: ImagePayload,
        options: Option<TryOffOptions>,
    ) -> Result<String, SessionError> {
        self.start(ProcessingRequest::TryOff {
            model_image,
            options,
        })
        .await
    }

    /// Shared submission path for both job types
    ///
    /// Rejects with `Busy` while a job is submitting or active. On
    /// acceptance the session moves to `Submitting`, the request is
    /// transmitted, and on success the poller starts. A cancel or reset
    /// racing the submission is detected by generation mismatch; the
    /// late-arriving job id is then cancelled server-side and never
    /// resurrects local state.
    async fn start(&self, request: ProcessingRequest) -> Result<String, SessionError> {
        let job_type = request.job_type();

        let generation = {
            let mut guarded = self.inner.lock();
            guarded.machine.begin_submit()?;
            guarded.generation += 1;
            guarded.poller = None;
            self.inner.publish(&guarded);
            guarded.generation
        };

        info!("Submitting {:?} job", job_type);

        match self.inner.transport.submit(request).await {
            Ok(job_id) => {
                let mut guarded = self.inner.lock();
                if guarded.generation != generation {
                    drop(guarded);
                    info!(
                        "Session moved on while submitting; cancelling job {} server-side",
                        job_id
                    );
                    self.inner.spawn_remote_cancel(job_id);
                    return Err(SessionError::Cancelled);
                }

                guarded
                    .machine
                    .submit_succeeded(Job::submitted(job_id.clone(), job_type));
                guarded.poller = Some(spawn_poller(
                    Arc::clone(&self.inner.transport),
                    self.inner.config.clone(),
                    job_id.clone(),
                    generation,
                    Arc::clone(&self.inner) as Arc<dyn SnapshotSink>,
                ));
                self.inner.publish(&guarded);

                info!(
                    "Job {} active, polling every {:?}",
                    job_id, self.inner.config.poll_interval
                );
                Ok(job_id)
            }
            Err(e) => {
                warn!("Submission failed: {}", e);
                let error = SessionError::from(e);
                let mut guarded = self.inner.lock();
                if guarded.generation == generation {
                    guarded.machine.submit_failed(error.clone());
                    self.inner.publish(&guarded);
                }
                Err(error)
            }
        }
    }

    /// Cancels the active job, if any
    ///
    /// Local state changes synchronously: the session is `Cancelled` and
    /// the poller stopped before this returns. The network cancel is
    /// fire-and-forget; its outcome cannot resurrect the session.
    pub fn cancel(&self) {
        let job_id = {
            let mut guarded = self.inner.lock();
            match guarded.machine.cancel() {
                CancelOutcome::NotActive => {
                    debug!("Cancel requested with no active job");
                    return;
                }
                CancelOutcome::Cancelled(job_id) => {
                    guarded.generation += 1;
                    guarded.poller = None;
                    self.inner.publish(&guarded);
                    job_id
                }
            }
        };

        match job_id {
            Some(job_id) => {
                info!("Cancelled job {} locally, notifying backend", job_id);
                self.inner.spawn_remote_cancel(job_id);
            }
            // Still submitting; the submit continuation will cancel the
            // job id once it materializes.
            None => info!("Cancelled session before submission returned an id"),
        }
    }

    /// Forces the session back to `Idle` from any state
    ///
    /// Stops any active poller and discards the job and error.
    pub fn reset(&self) {
        let mut guarded = self.inner.lock();
        guarded.generation += 1;
        guarded.poller = None;
        guarded.machine.reset();
        self.inner.publish(&guarded);
        debug!("Session reset to idle");
    }
}

impl<T: JobTransport + 'static> Inner<T> {
    fn lock(&self) -> MutexGuard<'_, Guarded> {
        self.guarded.lock().expect("session state lock poisoned")
    }

    /// Publishes the machine's view to all observers
    fn publish(&self, guarded: &Guarded) {
        self.watch_tx.send_replace(guarded.machine.view());
    }

    /// Best-effort server-side cancel, detached from the session
    fn spawn_remote_cancel(&self, job_id: String) {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            if let Err(e) = transport.cancel(&job_id).await {
                warn!("Best-effort cancel of job {} failed: {}", job_id, e);
            }
        });
    }
}

impl<T: JobTransport + 'static> SnapshotSink for Inner<T> {
    fn on_snapshot(&self, generation: u64, snapshot: JobSnapshot) -> PollControl {
        let mut guarded = self.lock();
        if guarded.generation != generation {
            debug!("Discarding stale snapshot for job {}", snapshot.id);
            return PollControl::Stop;
        }

        match guarded.machine.apply_snapshot(snapshot) {
            SnapshotOutcome::Applied => {
                self.publish(&guarded);
                PollControl::Continue
            }
            SnapshotOutcome::Settled => {
                self.publish(&guarded);
                info!("Job settled");
                PollControl::Stop
            }
            SnapshotOutcome::Ignored => PollControl::Stop,
        }
    }

    fn on_poll_error(&self, generation: u64, error: &ClientError) {
        let mut guarded = self.lock();
        if guarded.generation != generation {
            return;
        }
        guarded.machine.poll_error(SessionError::from(error));
        self.publish(&guarded);
    }

    fn on_poll_exhausted(&self, generation: u64, error: ClientError) {
        let mut guarded = self.lock();
        if guarded.generation != generation {
            return;
        }
        warn!("Giving up on job after repeated poll failures: {}", error);
        guarded.machine.poll_exhausted(error.into());
        self.publish(&guarded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use vizart_core::domain::job::{JobStatus, ProcessingResult};

    use crate::state::Phase;
    use crate::testing::{
        MockTransport, completed_snapshot, failed_snapshot, processing_snapshot,
    };

    fn config() -> SessionConfig {
        SessionConfig {
            poll_interval: Duration::from_millis(500),
            failure_threshold: 3,
        }
    }

    fn model() -> ImagePayload {
        ImagePayload::new("model.jpg", vec![1, 2, 3])
    }

    fn garment() -> ImagePayload {
        ImagePayload::new("shirt.png", vec![4, 5, 6])
    }

    fn orchestrator_with(
        transport: &Arc<MockTransport>,
    ) -> ProcessingOrchestrator<MockTransport> {
        ProcessingOrchestrator::with_transport(Arc::clone(transport), config())
    }

    #[tokio::test(start_paused = true)]
    async fn test_try_on_happy_path() {
        let transport = Arc::new(MockTransport::new());
        transport.push_submit(Ok("J1".to_string()));
        transport.push_status(Ok(processing_snapshot("J1", 40.0)));
        transport.push_status(Ok(completed_snapshot("J1", "r1.png")));

        let orchestrator = orchestrator_with(&transport);

        let job_id = orchestrator
            .start_try_on(model(), garment(), None)
            .await
            .unwrap();
        assert_eq!(job_id, "J1");

        // Exactly one Submitting -> Active transition before any snapshot
        let view = orchestrator.current();
        assert_eq!(view.phase, Phase::Active);
        assert_eq!(view.job.as_ref().unwrap().status, JobStatus::Pending);
        assert_eq!(view.progress(), 0);

        // First poll reports progress 40
        tokio::time::sleep(Duration::from_millis(600)).await;
        let view = orchestrator.current();
        assert_eq!(view.phase, Phase::Active);
        assert_eq!(view.progress(), 40);

        // Second poll settles with the result
        tokio::time::sleep(Duration::from_millis(500)).await;
        let view = orchestrator.current();
        assert_eq!(view.phase, Phase::Terminal);
        let job = view.job.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.completed_at.is_some());
        match job.result.unwrap() {
            ProcessingResult::TryOn {
                result_image_url, ..
            } => assert_eq!(result_image_url, "r1.png"),
            other => panic!("expected try-on result, got {:?}", other),
        }

        // Polling stopped itself on the terminal snapshot
        let calls = transport.status_calls();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(transport.status_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_observers_see_every_transition() {
        let transport = Arc::new(MockTransport::new());
        transport.push_submit(Ok("J1".to_string()));
        transport.push_status(Ok(processing_snapshot("J1", 25.0)));
        transport.push_status(Ok(processing_snapshot("J1", 70.0)));
        transport.push_status(Ok(completed_snapshot("J1", "r1.png")));

        let orchestrator = orchestrator_with(&transport);
        let mut rx = orchestrator.subscribe();

        let collector = tokio::spawn(async move {
            let mut history = Vec::new();
            loop {
                rx.changed().await.unwrap();
                let view = rx.borrow_and_update().clone();
                let settled = view.phase.is_settled();
                history.push(view);
                if settled {
                    break;
                }
            }
            history
        });

        orchestrator
            .start_try_on(model(), garment(), None)
            .await
            .unwrap();

        let history = tokio::time::timeout(Duration::from_secs(30), collector)
            .await
            .unwrap()
            .unwrap();

        // Progress never decreases across observed views
        let progresses: Vec<u8> = history.iter().map(|view| view.progress()).collect();
        assert!(progresses.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(history.last().unwrap().phase, Phase::Terminal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_while_job_active() {
        let transport = Arc::new(MockTransport::new());
        transport.push_submit(Ok("J1".to_string()));
        transport.set_repeat_status(processing_snapshot("J1", 10.0));

        let orchestrator = orchestrator_with(&transport);
        orchestrator
            .start_try_on(model(), garment(), None)
            .await
            .unwrap();

        let err = orchestrator
            .start_try_off(model(), None)
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::Busy);

        // The existing job is unaffected
        let view = orchestrator.current();
        assert_eq!(view.phase, Phase::Active);
        assert_eq!(view.job.unwrap().id, "J1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_failure_surfaces_error_and_returns_to_idle() {
        let transport = Arc::new(MockTransport::new());
        transport.push_submit(Err(ClientError::api_error(500, "queue unavailable")));

        let orchestrator = orchestrator_with(&transport);
        let err = orchestrator
            .start_try_off(model(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Server(_)));

        let view = orchestrator.current();
        assert_eq!(view.phase, Phase::Idle);
        assert!(view.job.is_none());
        assert!(view.error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_late_snapshot() {
        let transport = Arc::new(MockTransport::new());
        transport.push_submit(Ok("J1".to_string()));
        transport.set_status_delay(Duration::from_millis(400));
        transport.set_repeat_status(completed_snapshot("J1", "r1.png"));

        let orchestrator = orchestrator_with(&transport);
        orchestrator.start_try_off(model(), None).await.unwrap();

        // Let the first poll dispatch, then cancel while it is in flight
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(transport.status_calls(), 1);
        orchestrator.cancel();

        // Cancellation is immediate from the caller's point of view
        let view = orchestrator.current();
        assert_eq!(view.phase, Phase::Cancelled);
        assert_eq!(view.job.as_ref().unwrap().status, JobStatus::Cancelled);

        // The late terminal result never resurrects the session
        tokio::time::sleep(Duration::from_secs(5)).await;
        let view = orchestrator.current();
        assert_eq!(view.phase, Phase::Cancelled);
        assert_eq!(view.job.unwrap().status, JobStatus::Cancelled);
        assert_eq!(transport.cancelled_jobs(), vec!["J1".to_string()]);
        assert_eq!(transport.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_submission() {
        let transport = Arc::new(MockTransport::new());
        transport.set_submit_delay(Duration::from_millis(300));
        transport.push_submit(Ok("J9".to_string()));

        let orchestrator = orchestrator_with(&transport);
        let background = orchestrator.clone();
        let submission =
            tokio::spawn(async move { background.start_try_off(model(), None).await });

        // Cancel while the submit call is still in flight
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(orchestrator.current().phase, Phase::Submitting);
        orchestrator.cancel();
        assert_eq!(orchestrator.current().phase, Phase::Cancelled);

        let result = submission.await.unwrap();
        assert_eq!(result, Err(SessionError::Cancelled));

        // The orphaned job id was cancelled server-side, and no polling
        // ever started for it
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(transport.cancelled_jobs(), vec!["J9".to_string()]);
        assert_eq!(transport.status_calls(), 0);
        assert_eq!(orchestrator.current().phase, Phase::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_without_job_is_noop() {
        let transport = Arc::new(MockTransport::new());
        let orchestrator = orchestrator_with(&transport);

        orchestrator.cancel();
        assert_eq!(orchestrator.current().phase, Phase::Idle);
        assert!(transport.cancelled_jobs().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_failures_exhaust_threshold() {
        let transport = Arc::new(MockTransport::new());
        transport.push_submit(Ok("J1".to_string()));
        for _ in 0..3 {
            transport.push_status(Err(ClientError::ParseError("timeout".to_string())));
        }

        let orchestrator = orchestrator_with(&transport);
        orchestrator.start_try_off(model(), None).await.unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;

        let view = orchestrator.current();
        assert_eq!(view.phase, Phase::Terminal);
        assert!(matches!(view.error, Some(SessionError::Transport(_))));
        assert_eq!(transport.status_calls(), 3);

        // reset() returns the session to Idle, ready for a new submission
        orchestrator.reset();
        let view = orchestrator.current();
        assert_eq!(view.phase, Phase::Idle);
        assert!(view.job.is_none());
        assert!(view.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_settles_with_reason() {
        let transport = Arc::new(MockTransport::new());
        transport.push_submit(Ok("J1".to_string()));
        transport.push_status(Ok(failed_snapshot("J1", "pose detection failed")));

        let orchestrator = orchestrator_with(&transport);
        orchestrator
            .start_try_on(model(), garment(), None)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;

        let view = orchestrator.current();
        assert_eq!(view.phase, Phase::Terminal);
        assert_eq!(view.job.as_ref().unwrap().status, JobStatus::Failed);
        assert_eq!(
            view.error,
            Some(SessionError::Server("pose detection failed".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_stops_polling() {
        let transport = Arc::new(MockTransport::new());
        transport.push_submit(Ok("J1".to_string()));
        transport.set_repeat_status(processing_snapshot("J1", 10.0));

        let orchestrator = orchestrator_with(&transport);
        orchestrator.start_try_off(model(), None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(transport.status_calls() >= 2);

        orchestrator.reset();
        assert_eq!(orchestrator.current().phase, Phase::Idle);

        // No timer survives the reset
        let calls = transport.status_calls();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(transport.status_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_submission_after_settled_job() {
        let transport = Arc::new(MockTransport::new());
        transport.push_submit(Ok("J1".to_string()));
        transport.push_status(Ok(completed_snapshot("J1", "r1.png")));
        transport.push_submit(Ok("J2".to_string()));
        transport.set_repeat_status(processing_snapshot("J2", 5.0));

        let orchestrator = orchestrator_with(&transport);
        orchestrator.start_try_off(model(), None).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(orchestrator.current().phase, Phase::Terminal);

        // Superseding the settled job is allowed without reset()
        let job_id = orchestrator
            .start_try_on(model(), garment(), None)
            .await
            .unwrap();
        assert_eq!(job_id, "J2");
        let view = orchestrator.current();
        assert_eq!(view.phase, Phase::Active);
        assert_eq!(view.job.unwrap().id, "J2");
    }
}
