//! Serial generation queue.
//!
//! A single driver task pulls the first queued job from the [`JobStore`],
//! runs it through the [`GenerationClient`], writes the outcome back and
//! waits out a cooldown before pulling again. At most one job is ever
//! generating.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::models::job::{JobPatch, JobStatus};
use crate::services::generation::{GenerationClient, GenerationError};
use crate::services::job_store::{Claim, JobStore};

/// Delay between two dispatches.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(1000);

const PROMPT_PREVIEW_CHARS: usize = 48;

/// Lifecycle of the queue driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DriverState {
    /// Nothing queued; waiting for the store to change.
    IdleWaiting,
    /// A generation call is in flight.
    #[serde(rename_all = "camelCase")]
    Dispatching { job_id: Uuid, cycle: u64 },
    /// The last call settled; waiting before the next pull.
    CoolingDown { cycle: u64 },
    Stopped,
}

impl DriverState {
    pub fn is_processing(&self) -> bool {
        matches!(
            self,
            DriverState::Dispatching { .. } | DriverState::CoolingDown { .. }
        )
    }
}

pub struct QueueDriver {
    store: JobStore,
    client: Arc<dyn GenerationClient>,
    cooldown: Duration,
    state: watch::Sender<DriverState>,
    cycle: u64,
}

/// Owner of a running driver task. Dropping it also stops the driver.
pub struct DriverHandle {
    state: watch::Receiver<DriverState>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl DriverHandle {
    pub fn state(&self) -> DriverState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<DriverState> {
        self.state.clone()
    }

    /// Stop pulling new jobs. An in-flight call is allowed to settle first.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Queue driver task failed");
        }
    }
}

impl QueueDriver {
    pub fn new(store: JobStore, client: Arc<dyn GenerationClient>, cooldown: Duration) -> Self {
        let (state, _) = watch::channel(DriverState::IdleWaiting);
        Self {
            store,
            client,
            cooldown,
            state,
            cycle: 0,
        }
    }

    /// Run the driver on the current tokio runtime.
    pub fn spawn(self) -> DriverHandle {
        let state = self.state.subscribe();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        DriverHandle {
            state,
            shutdown,
            task,
        }
    }

    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(cooldown_ms = self.cooldown.as_millis() as u64, "Queue driver started");
        let mut changes = self.store.subscribe();

        loop {
            changes.borrow_and_update();

            if let Some(claim) = self.store.claim_next() {
                self.dispatch(claim).await;

                self.set_state(DriverState::CoolingDown { cycle: self.cycle });
                if !self.cool_down(&mut shutdown).await {
                    break;
                }
                continue;
            }

            self.set_state(DriverState::IdleWaiting);
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = shutdown.changed() => break,
            }
        }

        self.set_state(DriverState::Stopped);
        tracing::info!(cycles = self.cycle, "Queue driver stopped");
    }

    /// One cycle: call the client for `claim` and record the outcome.
    async fn dispatch(&mut self, claim: Claim) {
        self.cycle += 1;
        let cycle = self.cycle;
        self.set_state(DriverState::Dispatching {
            job_id: claim.job_id,
            cycle,
        });

        tracing::info!(
            job_id = %claim.job_id,
            cycle,
            aspect_ratio = %claim.settings.aspect_ratio,
            prompt = %preview(&claim.prompt),
            "Dispatching generation"
        );

        let start = Instant::now();
        let outcome = self.generate(&claim).await;
        let elapsed = start.elapsed();
        metrics::histogram!("generation_duration_seconds").record(elapsed.as_secs_f64());

        if self.store.epoch() != claim.epoch {
            tracing::debug!(job_id = %claim.job_id, cycle, "Queue cleared during generation, result discarded");
            return;
        }

        match outcome {
            Ok(image_url) => {
                if self.store.update_status(
                    claim.job_id,
                    JobStatus::Completed,
                    JobPatch::completed(image_url),
                ) {
                    metrics::counter!("generation_jobs_completed_total").increment(1);
                    tracing::info!(
                        job_id = %claim.job_id,
                        cycle,
                        duration_ms = elapsed.as_millis() as u64,
                        "Generation completed"
                    );
                } else {
                    tracing::debug!(job_id = %claim.job_id, "Job removed during generation, result discarded");
                }
            }
            Err(e) => {
                let message = e.job_message();
                if self.store.update_status(
                    claim.job_id,
                    JobStatus::Failed,
                    JobPatch::failed(message),
                ) {
                    metrics::counter!("generation_jobs_failed_total").increment(1);
                    tracing::warn!(
                        job_id = %claim.job_id,
                        cycle,
                        duration_ms = elapsed.as_millis() as u64,
                        error = %e,
                        "Generation failed"
                    );
                } else {
                    tracing::debug!(job_id = %claim.job_id, "Job removed during generation, failure discarded");
                }
            }
        }

        metrics::gauge!("generation_queue_depth").set(self.store.counts().queued as f64);
    }

    /// Call the client on its own task so a panicking client fails the job
    /// instead of killing the driver.
    async fn generate(&self, claim: &Claim) -> Result<String, GenerationError> {
        let client = Arc::clone(&self.client);
        let prompt = claim.prompt.clone();
        let settings = claim.settings;

        match tokio::spawn(async move { client.generate(&prompt, &settings).await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(job_id = %claim.job_id, error = %e, "Generation task aborted");
                Err(GenerationError::Rejected(String::new()))
            }
        }
    }

    /// Wait out the full cooldown, even across a clear-all. Returns `false`
    /// when the driver should stop.
    async fn cool_down(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.cooldown) => true,
            _ = shutdown.changed() => false,
        }
    }

    fn set_state(&self, state: DriverState) {
        self.state.send_replace(state);
    }
}

fn preview(prompt: &str) -> String {
    let mut chars = prompt.chars();
    let head: String = chars.by_ref().take(PROMPT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
