//! Note CRUD HTTP handlers.
//!
//! Wire contract (field names literal, camelCase):
//! - `GET /api/notes/{videoId}` → 200 array of notes
//! - `POST /api/notes` → 200 `{ok:true, entry}` | 400
//! - `PUT /api/notes` → 200 `{ok:true}` | 400 | 404
//! - `DELETE /api/notes` → 200 `{ok:true}` | 400 | 404
//!
//! Payload fields are all optional at the serde level so that a missing
//! required field surfaces as a 400 validation error with an `{error}` body
//! rather than an extractor rejection.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{ApiError, AppState};
use clipnote_core::{DeleteNoteRequest, NoteEntry, UpsertNoteRequest};

/// Request body for POST and PUT.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePayload {
    pub video_id: Option<String>,
    pub timestamp: Option<f64>,
    pub transcript: Option<String>,
    #[serde(default)]
    pub overall: bool,
}

impl NotePayload {
    fn into_request(self) -> UpsertNoteRequest {
        UpsertNoteRequest {
            video_id: self.video_id.unwrap_or_default(),
            timestamp: self.timestamp,
            transcript: self.transcript.unwrap_or_default(),
            overall: self.overall,
        }
    }
}

/// Request body for DELETE.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNotePayload {
    pub video_id: Option<String>,
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub overall: bool,
}

impl DeleteNotePayload {
    fn into_request(self) -> DeleteNoteRequest {
        DeleteNoteRequest {
            video_id: self.video_id.unwrap_or_default(),
            timestamp: self.timestamp,
            overall: self.overall,
        }
    }
}

/// Mistyped fields (e.g. a string timestamp) are validation failures, not
/// extractor rejections, so they get the same 400 `{error}` shape.
fn parse_payload<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::BadRequest(format!("invalid payload: {e}")))
}

/// List all notes for a video, overall note first, then ascending timestamp.
///
/// Unknown videos return an empty array, never 404.
pub async fn list_notes(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<Vec<NoteEntry>>, ApiError> {
    let notes = state.store.list(&video_id).await?;
    Ok(Json(notes))
}

/// Create a note, or replace the one sharing its (timestamp | overall) key.
pub async fn create_note(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let payload: NotePayload = parse_payload(payload)?;
    let entry = state.store.upsert(payload.into_request()).await?;
    Ok(Json(json!({ "ok": true, "entry": entry })))
}

/// Edit an existing note's transcript. 404 if no entry matches the key.
pub async fn update_note(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let payload: NotePayload = parse_payload(payload)?;
    state.store.update(payload.into_request()).await?;
    Ok(Json(json!({ "ok": true })))
}

/// Delete the note matching the key (all overall notes for an overall key).
pub async fn delete_note(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let payload: DeleteNotePayload = parse_payload(payload)?;
    state.store.delete(payload.into_request()).await?;
    Ok(Json(json!({ "ok": true })))
}
