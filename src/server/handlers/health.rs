use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store_reachable = match state.store.health_check().await {
        Ok(healthy) => healthy,
        Err(err) => {
            tracing::warn!("Vector store health check failed: {}", err);
            false
        }
    };

    Json(json!({
        "vector_store": {
            "backend": state.store.name(),
            "reachable": store_reachable,
        },
        "embedding_model": state.config.embedding.model,
        "embedding_dimensions": state.config.embedding.dimensions,
        "completion_model": state.orchestrator.completion_model(),
        "top_k": state.config.retrieval.top_k,
        "active_sessions": state.sessions.len(),
        "uptime_secs": (Utc::now() - state.started_at).num_seconds(),
    }))
}
