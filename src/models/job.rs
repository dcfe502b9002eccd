use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::settings::GenerationSettings;

/// Status of an image generation job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Reserved; never produced by the queue.
    Idle,
    Queued,
    Generating,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One prompt's generation request and its lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageJob {
    pub id: Uuid,
    pub prompt: String,
    pub status: JobStatus,
    /// Settings captured when the job was submitted.
    pub settings: GenerationSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImageJob {
    /// Create a queued job with a fresh id.
    pub fn queued(prompt: impl Into<String>, settings: GenerationSettings) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            prompt: prompt.into(),
            status: JobStatus::Queued,
            settings,
            image_url: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a status change and merge `patch`, then drop whichever result
    /// field does not belong to the new status.
    pub(crate) fn apply(&mut self, status: JobStatus, patch: JobPatch) {
        self.status = status;
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(error) = patch.error {
            self.error = Some(error);
        }
        if status != JobStatus::Completed {
            self.image_url = None;
        }
        if status != JobStatus::Failed {
            self.error = None;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial fields merged into a job by a status update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub image_url: Option<String>,
    pub error: Option<String>,
}

impl JobPatch {
    pub fn completed(image_url: impl Into<String>) -> Self {
        Self {
            image_url: Some(image_url.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            image_url: None,
            error: Some(error.into()),
        }
    }
}

/// Aggregate job counts for display.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobCounts {
    pub total: usize,
    pub queued: usize,
    pub generating: usize,
    pub completed: usize,
    pub failed: usize,
}

impl JobCounts {
    pub fn tally<'a>(jobs: impl IntoIterator<Item = &'a ImageJob>) -> Self {
        jobs.into_iter().fold(Self::default(), |mut counts, job| {
            counts.total += 1;
            match job.status {
                JobStatus::Queued => counts.queued += 1,
                JobStatus::Generating => counts.generating += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
                JobStatus::Idle => {}
            }
            counts
        })
    }
}
