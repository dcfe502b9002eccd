use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// GET /metrics — Prometheus text exposition of the queue metrics.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}

/// Register descriptions for every metric the service emits.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "generation_jobs_submitted_total",
        "Total image generation jobs submitted"
    );
    metrics::describe_counter!(
        "generation_jobs_completed_total",
        "Total image generation jobs completed"
    );
    metrics::describe_counter!(
        "generation_jobs_failed_total",
        "Total image generation jobs that failed"
    );
    metrics::describe_histogram!(
        "generation_duration_seconds",
        "Time spent waiting on the image generation service per job"
    );
    metrics::describe_gauge!(
        "generation_queue_depth",
        "Current number of queued jobs"
    );
}
