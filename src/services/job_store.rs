//! In-memory job store.
//!
//! Every mutation goes through one `watch` channel, so readers always see a
//! consistent snapshot and the queue driver is woken on each change.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use crate::models::job::{ImageJob, JobCounts, JobPatch, JobStatus};
use crate::models::settings::GenerationSettings;

/// Point-in-time view of the store.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    jobs: Vec<ImageJob>,
    epoch: u64,
    issued: Arc<HashSet<Uuid>>,
}

impl StoreSnapshot {
    /// Jobs in store order (oldest first).
    pub fn jobs(&self) -> &[ImageJob] {
        &self.jobs
    }

    /// Incremented by every clear-all.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn get(&self, id: Uuid) -> Option<&ImageJob> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn counts(&self) -> JobCounts {
        JobCounts::tally(&self.jobs)
    }
}

/// A job claimed by the queue driver for one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub job_id: Uuid,
    pub prompt: String,
    pub settings: GenerationSettings,
    pub epoch: u64,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("job id {0} is already in use")]
    DuplicateId(Uuid),
}

/// Shared handle to the ordered job collection.
#[derive(Clone)]
pub struct JobStore {
    tx: Arc<watch::Sender<StoreSnapshot>>,
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(StoreSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    /// Reactive read-only view. The receiver is notified after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.tx.borrow().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<ImageJob> {
        self.tx.borrow().get(id).cloned()
    }

    pub fn counts(&self) -> JobCounts {
        self.tx.borrow().counts()
    }

    pub fn epoch(&self) -> u64 {
        self.tx.borrow().epoch
    }

    /// Create queued jobs for `prompts` and append them.
    pub fn submit(
        &self,
        prompts: Vec<String>,
        settings: GenerationSettings,
    ) -> Result<Vec<Uuid>, StoreError> {
        let jobs: Vec<ImageJob> = prompts
            .into_iter()
            .map(|prompt| ImageJob::queued(prompt, settings))
            .collect();
        let ids = jobs.iter().map(|job| job.id).collect();
        self.append(jobs)?;
        Ok(ids)
    }

    /// Append jobs after the existing ones, forcing them into the queued
    /// state. Rejects the whole batch if any id has been seen before.
    pub fn append(&self, jobs: Vec<ImageJob>) -> Result<(), StoreError> {
        let mut outcome = Ok(());
        self.mutate(|state| {
            let mut batch_ids = HashSet::with_capacity(jobs.len());
            for job in &jobs {
                if state.issued.contains(&job.id) || !batch_ids.insert(job.id) {
                    outcome = Err(StoreError::DuplicateId(job.id));
                    return false;
                }
            }
            if jobs.is_empty() {
                return false;
            }
            Arc::make_mut(&mut state.issued).extend(batch_ids);
            for mut job in jobs {
                job.apply(JobStatus::Queued, JobPatch::default());
                state.jobs.push(job);
            }
            true
        });
        outcome
    }

    /// Remove a job regardless of its status. Returns whether it existed.
    pub fn remove(&self, id: Uuid) -> bool {
        self.mutate(|state| {
            let before = state.jobs.len();
            state.jobs.retain(|job| job.id != id);
            state.jobs.len() != before
        })
    }

    /// Remove every job and start a new epoch, invalidating the running cycle.
    pub fn clear_all(&self) {
        self.mutate(|state| {
            state.jobs.clear();
            state.epoch += 1;
            true
        });
    }

    /// Set a job's status and merge `patch`. No-op when the job is gone.
    pub fn update_status(&self, id: Uuid, status: JobStatus, patch: JobPatch) -> bool {
        self.mutate(|state| match find_mut(&mut state.jobs, id) {
            Some(job) => {
                job.apply(status, patch);
                true
            }
            None => false,
        })
    }

    /// Put a job back in the queue, clearing any previous result.
    ///
    /// A job that is currently generating is left alone; its in-flight call
    /// still owns it. Returns whether the job exists.
    pub fn retry(&self, id: Uuid) -> bool {
        let mut found = false;
        self.mutate(|state| match find_mut(&mut state.jobs, id) {
            Some(job) => {
                found = true;
                if job.status == JobStatus::Generating {
                    return false;
                }
                job.apply(JobStatus::Queued, JobPatch::default());
                true
            }
            None => false,
        });
        found
    }

    /// Mark the first queued job as generating and hand it to the caller.
    pub fn claim_next(&self) -> Option<Claim> {
        let mut claim = None;
        self.mutate(|state| {
            let epoch = state.epoch;
            let Some(job) = state
                .jobs
                .iter_mut()
                .find(|job| job.status == JobStatus::Queued)
            else {
                return false;
            };
            job.apply(JobStatus::Generating, JobPatch::default());
            claim = Some(Claim {
                job_id: job.id,
                prompt: job.prompt.clone(),
                settings: job.settings,
                epoch,
            });
            true
        });
        claim
    }

    fn mutate<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut StoreSnapshot) -> bool,
    {
        self.tx.send_if_modified(f)
    }
}

fn find_mut(jobs: &mut [ImageJob], id: Uuid) -> Option<&mut ImageJob> {
    jobs.iter_mut().find(|job| job.id == id)
}
