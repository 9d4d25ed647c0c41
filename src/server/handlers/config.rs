use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use crate::core::config::service::redact_sensitive_values;
use crate::core::errors::ApiError;
use crate::state::AppState;

/// Effective configuration with credentials masked.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let value = serde_json::to_value(state.config.as_ref()).map_err(ApiError::internal)?;
    Ok(Json(redact_sensitive_values(&value)))
}
