//! clipnote-api - HTTP API server for clipnote.
//!
//! The router and state live in the library so integration tests can drive
//! the full HTTP surface without binding a socket.

pub mod handlers;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use clipnote_core::NoteRepository;

use handlers::notes::{create_note, delete_note, list_notes, update_note};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Note storage backend.
    pub store: Arc<dyn NoteRepository>,
}

/// Build the application router. Middleware layers (trace, CORS, request-id,
/// body limit) are applied by the binary around this.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/notes/:video_id", get(list_notes))
        .route(
            "/api/notes",
            post(create_note).put(update_note).delete(delete_note),
        )
        .with_state(state)
}

/// Liveness probe.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

/// HTTP-facing error wrapper around [`clipnote_core::Error`].
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<clipnote_core::Error> for ApiError {
    fn from(err: clipnote_core::Error) -> Self {
        match err {
            clipnote_core::Error::NotFound => ApiError::NotFound(err.to_string()),
            clipnote_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
