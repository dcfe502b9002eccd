use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::batch::{JobsResponse, SubmitBatchRequest, SubmitBatchResponse};
use crate::models::job::{ImageJob, JobStatus};
use crate::routes::error::{ApiError, ApiResult};
use crate::services::image_data;

/// POST /api/v1/jobs — Queue a batch of prompts.
pub async fn submit_batch(
    State(state): State<AppState>,
    Json(request): Json<SubmitBatchRequest>,
) -> ApiResult<(StatusCode, Json<SubmitBatchResponse>)> {
    request.validate()?;

    let batch = request.normalized();
    batch.validate()?;

    // A batch's settings become the defaults for later batches.
    let settings = match request.settings {
        Some(settings) => {
            *state.settings.write().await = settings;
            settings
        }
        None => *state.settings.read().await,
    };

    let job_ids = state.store.submit(batch.prompts, settings)?;

    metrics::counter!("generation_jobs_submitted_total").increment(job_ids.len() as u64);
    metrics::gauge!("generation_queue_depth").set(state.store.counts().queued as f64);
    tracing::info!(
        jobs = job_ids.len(),
        aspect_ratio = %settings.aspect_ratio,
        "Batch queued"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitBatchResponse { job_ids, settings }),
    ))
}

/// GET /api/v1/jobs — All jobs in store order with aggregate counts.
pub async fn list_jobs(State(state): State<AppState>) -> Json<JobsResponse> {
    let snapshot = state.store.snapshot();
    Json(JobsResponse {
        counts: snapshot.counts(),
        jobs: snapshot.jobs().to_vec(),
        processing: state.driver_state().is_processing(),
    })
}

/// GET /api/v1/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ImageJob>> {
    state.store.get(id).map(Json).ok_or(ApiError::JobNotFound(id))
}

/// DELETE /api/v1/jobs/{id} — Remove a job whatever its status.
pub async fn remove_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.store.remove(id) {
        tracing::info!(job_id = %id, "Job removed");
    }
    StatusCode::NO_CONTENT
}

/// DELETE /api/v1/jobs — Remove every job.
pub async fn clear_jobs(State(state): State<AppState>) -> StatusCode {
    let removed = state.store.counts().total;
    state.store.clear_all();
    metrics::gauge!("generation_queue_depth").set(0.0);
    tracing::info!(removed, "Queue cleared");
    StatusCode::NO_CONTENT
}

/// POST /api/v1/jobs/{id}/retry — Put a job back in the queue.
pub async fn retry_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ImageJob>> {
    if !state.store.retry(id) {
        return Err(ApiError::JobNotFound(id));
    }
    tracing::info!(job_id = %id, "Job retried");
    state.store.get(id).map(Json).ok_or(ApiError::JobNotFound(id))
}

/// GET /api/v1/jobs/{id}/image — Download a completed job's image.
pub async fn download_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let job = state.store.get(id).ok_or(ApiError::JobNotFound(id))?;

    let image_url = match (job.status, job.image_url) {
        (JobStatus::Completed, Some(url)) => url,
        _ => {
            return Err(ApiError::Conflict(format!(
                "job {} has no image to download",
                id
            )))
        }
    };

    let Some(image) = image_data::decode_data_uri(&image_url) else {
        return Ok(Redirect::temporary(&image_url).into_response());
    };

    let disposition = format!(
        "attachment; filename=\"generated-{}.{}\"",
        id,
        image.extension()
    );

    Ok((
        [
            (header::CONTENT_TYPE, image.mime_type.clone()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        image.bytes,
    )
        .into_response())
}
