use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracker_core::{
    update, DismissVia, Effect, JobId, Msg, StatusUpdate, TrackerState, TrackerView,
};
use tracker_logging::{tracker_debug, tracker_info};

use crate::{IndexJobRequest, JobService, TrackerError};

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    /// Cadence of the active poller.
    pub poll_interval: Duration,
    /// Delay between a job first being seen finished and its auto-dismissal.
    pub auto_dismiss_after: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2000),
            auto_dismiss_after: Duration::from_millis(10_000),
        }
    }
}

type DismissReply = oneshot::Sender<Result<DismissVia, TrackerError>>;

enum Command {
    Dispatch(Msg),
    Dismiss { job_id: JobId, reply: DismissReply },
    Shutdown,
}

/// Entry point for the presentation layer.
///
/// Cheap to clone. The tracker task keeps running until [`shutdown`] is called
/// or the last handle is dropped.
///
/// [`shutdown`]: TrackerHandle::shutdown
#[derive(Clone)]
pub struct TrackerHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    view_rx: watch::Receiver<TrackerView>,
    service: Arc<dyn JobService>,
}

impl TrackerHandle {
    /// Starts the tracker task on the current tokio runtime and kicks off the
    /// initial reconcile.
    pub fn spawn(service: Arc<dyn JobService>, settings: TrackerSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let state = TrackerState::new();
        let (view_tx, view_rx) = watch::channel(state.view());

        let driver = Driver {
            state,
            service: service.clone(),
            settings,
            self_tx: cmd_tx.downgrade(),
            view_tx,
            shutdown: CancellationToken::new(),
            poller: None,
            pending_dismissals: HashMap::new(),
        };
        tokio::spawn(driver.run(cmd_rx));

        let handle = Self {
            cmd_tx,
            view_rx,
            service,
        };
        handle.dispatch(Msg::Started);
        handle
    }

    /// Track a job id returned by a successful submission.
    pub fn register(&self, job_id: impl Into<JobId>) {
        self.dispatch(Msg::RegisterRequested(job_id.into()));
    }

    /// Hide a job. Active jobs are cancelled on the server first; if that
    /// fails the job stays visible and the failure is returned.
    pub async fn dismiss(&self, job_id: impl Into<JobId>) -> Result<DismissVia, TrackerError> {
        let (reply, answer) = oneshot::channel();
        self.cmd_tx
            .send(Command::Dismiss {
                job_id: job_id.into(),
                reply,
            })
            .map_err(|_| TrackerError::Stopped)?;
        answer.await.map_err(|_| TrackerError::Stopped)?
    }

    /// Request a full reconcile against the server listing.
    pub fn refresh(&self) {
        self.dispatch(Msg::RefreshRequested);
    }

    /// Start an indexing job and track it.
    pub async fn submit(&self, request: &IndexJobRequest) -> Result<JobId, TrackerError> {
        if request.text_fields.is_empty() {
            return Err(TrackerError::InvalidRequest(
                "at least one text field is required".to_string(),
            ));
        }
        let job_id = self.service.create_index_job(request).await?;
        tracker_info!(
            "submitted job_id={} collection={}",
            job_id,
            request.collection_name
        );
        self.register(job_id.clone());
        Ok(job_id)
    }

    pub fn view(&self) -> TrackerView {
        self.view_rx.borrow().clone()
    }

    /// Receiver that is notified whenever the view changes.
    pub fn subscribe(&self) -> watch::Receiver<TrackerView> {
        self.view_rx.clone()
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(Command::Shutdown);
    }

    fn dispatch(&self, msg: Msg) {
        if self.cmd_tx.send(Command::Dispatch(msg)).is_err() {
            tracker_debug!("tracker stopped, message dropped");
        }
    }
}

/// Owns the state and applies every message in arrival order. Network calls
/// and timers run as separate tasks that report back through `self_tx`.
struct Driver {
    state: TrackerState,
    service: Arc<dyn JobService>,
    settings: TrackerSettings,
    self_tx: mpsc::WeakUnboundedSender<Command>,
    view_tx: watch::Sender<TrackerView>,
    shutdown: CancellationToken,
    poller: Option<CancellationToken>,
    pending_dismissals: HashMap<JobId, Vec<DismissReply>>,
}

impl Driver {
    async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = cmd_rx.recv().await {
            match command {
                Command::Dispatch(msg) => self.apply(msg),
                Command::Dismiss { job_id, reply } => {
                    self.pending_dismissals
                        .entry(job_id.clone())
                        .or_default()
                        .push(reply);
                    self.apply(Msg::DismissRequested(job_id));
                }
                Command::Shutdown => break,
            }
        }
        self.shutdown.cancel();
        tracker_info!("job tracker stopped");
    }

    fn apply(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.view_tx.send_replace(state.view());
        }
        self.state = state;

        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::FetchJobList => {
                let service = self.service.clone();
                self.spawn_reporting(async move {
                    let result = service
                        .list_jobs(false)
                        .await
                        .map_err(|err| err.to_string());
                    Msg::JobListFetched(result)
                });
            }
            Effect::FetchStatuses { job_ids } => {
                let service = self.service.clone();
                self.spawn_reporting(async move {
                    let fetches = job_ids.into_iter().map(|job_id| {
                        let service = service.clone();
                        async move {
                            let result = service
                                .get_job_status(&job_id)
                                .await
                                .map_err(|err| err.to_fetch_failure());
                            StatusUpdate { job_id, result }
                        }
                    });
                    Msg::StatusesFetched(join_all(fetches).await)
                });
            }
            Effect::StartPolling => self.start_poller(),
            Effect::StopPolling => {
                if let Some(token) = self.poller.take() {
                    token.cancel();
                }
            }
            Effect::CancelJob { job_id } => {
                let service = self.service.clone();
                self.spawn_reporting(async move {
                    let result = service
                        .cancel_job(&job_id)
                        .await
                        .map(|receipt| {
                            tracker_debug!(
                                "cancel accepted job_id={} status={}",
                                receipt.job_id,
                                receipt.status
                            );
                        })
                        .map_err(|err| err.message);
                    Msg::CancelFinished { job_id, result }
                });
            }
            Effect::ScheduleDismiss { job_id } => {
                let delay = self.settings.auto_dismiss_after;
                tracker_debug!("auto-dismiss armed job_id={} in {:?}", job_id, delay);
                self.spawn_reporting(async move {
                    tokio::time::sleep(delay).await;
                    Msg::DismissTimerFired(job_id)
                });
            }
            Effect::Dismissed { job_id, via } => self.answer_dismissal(&job_id, Ok(via)),
            Effect::CancelFailed { job_id, reason } => {
                let err = TrackerError::CancelFailed {
                    job_id: job_id.clone(),
                    reason,
                };
                self.answer_dismissal(&job_id, Err(err));
            }
        }
    }

    fn answer_dismissal(&mut self, job_id: &str, outcome: Result<DismissVia, TrackerError>) {
        for reply in self.pending_dismissals.remove(job_id).unwrap_or_default() {
            let _ = reply.send(outcome.clone());
        }
    }

    fn start_poller(&mut self) {
        if self.poller.is_some() {
            return;
        }
        let token = self.shutdown.child_token();
        let stop = token.clone();
        let period = self.settings.poll_interval.max(Duration::from_millis(1));
        let tx = self.self_tx.clone();

        tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticks.tick() => {
                        let Some(tx) = tx.upgrade() else { break };
                        if tx.send(Command::Dispatch(Msg::PollTick)).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        self.poller = Some(token);
    }

    /// Runs `work` in its own task and feeds the resulting message back,
    /// unless the tracker shuts down first.
    fn spawn_reporting<F>(&self, work: F)
    where
        F: Future<Output = Msg> + Send + 'static,
    {
        let tx = self.self_tx.clone();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                msg = work => {
                    if let Some(tx) = tx.upgrade() {
                        let _ = tx.send(Command::Dispatch(msg));
                    }
                }
            }
        });
    }
}
