use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tracing::Instrument;

use crate::rag::TurnError;
use crate::server::page::render_chat_page;
use crate::session::TurnOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

pub async fn start_chat(State(state): State<Arc<AppState>>) -> Redirect {
    let session_id = state.sessions.create();
    Redirect::to(&format!("/chat/{}", session_id))
}

pub async fn show_chat(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Response {
    let Some(handle) = state.sessions.get(&session_id) else {
        return Redirect::to("/").into_response();
    };

    let controller = handle.lock().await;
    Html(render_chat_page(&session_id, controller.transcript(), None)).into_response()
}

pub async fn submit_chat(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Form(form): Form<ChatForm>,
) -> Response {
    let Some(handle) = state.sessions.get(&session_id) else {
        return Redirect::to("/").into_response();
    };

    let mut controller = handle.lock().await;
    let span = tracing::info_span!("turn", session_id = %session_id);
    match controller.submit_turn(&form.message).instrument(span).await {
        Ok(TurnOutcome::Answered(_)) | Ok(TurnOutcome::Ignored) => {
            Redirect::to(&format!("/chat/{}", session_id)).into_response()
        }
        Err(err) => {
            tracing::warn!("Turn failed in session {} ({}): {}", session_id, err.kind(), err);
            let banner = failure_banner(&err);
            let page = render_chat_page(&session_id, controller.transcript(), Some(&banner));
            (StatusCode::BAD_GATEWAY, Html(page)).into_response()
        }
    }
}

fn failure_banner(err: &TurnError) -> String {
    let lead = match err {
        TurnError::Retrieval(_) => "Lavender could not reach her garden memories.",
        TurnError::Generation(_) => "Lavender could not find her words just now.",
    };
    format!("{} Please try again. ({})", lead, err)
}
