use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;
use crate::models::job::JobCounts;
use crate::services::queue::DriverState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub driver: DriverState,
    pub jobs: JobCounts,
}

/// GET /health — liveness plus queue driver status.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let driver = state.driver_state();

    let (status_code, status) = match driver {
        DriverState::Stopped => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
        _ => (StatusCode::OK, "ok"),
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        driver,
        jobs: state.store.counts(),
    };

    (status_code, Json(response))
}
