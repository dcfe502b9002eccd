use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::{ImageJob, JobCounts};
use crate::models::settings::GenerationSettings;

pub const MAX_BATCH_SIZE: usize = 200;
pub const MAX_PROMPT_CHARS: usize = 4000;

/// Request to submit a batch of prompts.
///
/// Prompts may be given as a list, as newline-separated `text`, or both.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBatchRequest {
    #[garde(skip)]
    #[serde(default)]
    pub prompts: Vec<String>,

    #[garde(skip)]
    pub text: Option<String>,

    #[garde(dive)]
    pub settings: Option<GenerationSettings>,
}

impl SubmitBatchRequest {
    /// Trimmed, non-empty prompts in submission order.
    pub fn normalized(&self) -> PromptBatch {
        let from_text = self.text.iter().flat_map(|text| text.lines());
        let prompts = self
            .prompts
            .iter()
            .map(String::as_str)
            .chain(from_text)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        PromptBatch { prompts }
    }
}

/// Normalized prompts of one batch, validated as a whole.
#[derive(Debug, Validate)]
pub struct PromptBatch {
    #[garde(
        length(min = 1, max = MAX_BATCH_SIZE),
        inner(length(chars, max = MAX_PROMPT_CHARS))
    )]
    pub prompts: Vec<String>,
}

/// Response after submitting a batch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBatchResponse {
    pub job_ids: Vec<Uuid>,
    pub settings: GenerationSettings,
}

/// Read view of the queue.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobsResponse {
    /// Jobs in store order (oldest first).
    pub jobs: Vec<ImageJob>,
    pub counts: JobCounts,
    pub processing: bool,
}
