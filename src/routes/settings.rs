use axum::extract::State;
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::models::settings::GenerationSettings;
use crate::routes::error::ApiResult;

/// GET /api/v1/settings — Settings applied to the next batch.
pub async fn get_settings(State(state): State<AppState>) -> Json<GenerationSettings> {
    Json(*state.settings.read().await)
}

/// PUT /api/v1/settings — Replace the default settings.
///
/// Jobs already in the queue keep the settings they were submitted with.
pub async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<GenerationSettings>,
) -> ApiResult<Json<GenerationSettings>> {
    settings.validate()?;
    *state.settings.write().await = settings;
    tracing::info!(aspect_ratio = %settings.aspect_ratio, "Default settings updated");
    Ok(Json(settings))
}
