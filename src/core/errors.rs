use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::rag::TurnError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("retrieval failed: {message}")]
    Retrieval { message: String, timed_out: bool },
    #[error("generation failed: {message}")]
    Generation { message: String, timed_out: bool },
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    /// Machine-readable kind carried next to the message in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Retrieval { .. } => "retrieval_failure",
            ApiError::Generation { .. } => "generation_failure",
            ApiError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Retrieval { timed_out, .. } | ApiError::Generation { timed_out, .. } => {
                if *timed_out {
                    StatusCode::GATEWAY_TIMEOUT
                } else {
                    StatusCode::BAD_GATEWAY
                }
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TurnError> for ApiError {
    fn from(err: TurnError) -> Self {
        let timed_out = err.is_timeout();
        match err {
            TurnError::Retrieval(inner) => ApiError::Retrieval {
                message: inner.to_string(),
                timed_out,
            },
            TurnError::Generation(inner) => ApiError::Generation {
                message: inner.to_string(),
                timed_out,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let message = match &self {
            ApiError::NotFound(msg)
            | ApiError::Retrieval { message: msg, .. }
            | ApiError::Generation { message: msg, .. } => msg.clone(),
            // Internal details stay in the logs.
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({ "error": message, "kind": self.kind() }));
        (self.status(), body).into_response()
    }
}
