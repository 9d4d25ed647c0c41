use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::Instrument;

use crate::core::errors::ApiError;
use crate::session::{SessionHandle, TurnOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitTurnRequest {
    #[serde(default)]
    pub question: String,
}

fn lookup(state: &AppState, session_id: &str) -> Result<SessionHandle, ApiError> {
    state
        .sessions
        .get(session_id)
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))
}

pub async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session_id = state.sessions.create();
    (StatusCode::CREATED, Json(json!({ "session_id": session_id })))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = lookup(&state, &session_id)?;
    let controller = handle.lock().await;
    let transcript = controller.transcript();

    Ok(Json(json!({
        "session_id": session_id,
        "turns": transcript.len(),
        "transcript": transcript,
    })))
}

pub async fn submit_turn(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<SubmitTurnRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = lookup(&state, &session_id)?;
    let mut controller = handle.lock().await;

    let span = tracing::info_span!("turn", session_id = %session_id);
    let outcome = controller
        .submit_turn(&payload.question)
        .instrument(span)
        .await
        .map_err(|err| {
            tracing::warn!("Turn failed in session {} ({}): {}", session_id, err.kind(), err);
            ApiError::from(err)
        })?;

    let body = match outcome {
        TurnOutcome::Ignored => json!({ "status": "ignored" }),
        TurnOutcome::Answered(_) => {
            let transcript = controller.transcript();
            let start = transcript.len().saturating_sub(2);
            json!({
                "status": "answered",
                "turns": &transcript[start..],
            })
        }
    };
    Ok(Json(body))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.sessions.end(&session_id) {
        return Err(ApiError::NotFound("Session not found".to_string()));
    }
    Ok(Json(json!({ "success": true })))
}
