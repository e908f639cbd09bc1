//! Core traits for clipnote abstractions.
//!
//! The repository trait defines the interface the storage backend must
//! satisfy, keeping HTTP handlers decoupled from the file format.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::NoteEntry;

/// Request for creating or replacing a note.
#[derive(Debug, Clone)]
pub struct UpsertNoteRequest {
    pub video_id: String,
    /// Required unless `overall` is set.
    pub timestamp: Option<f64>,
    pub transcript: String,
    pub overall: bool,
}

impl UpsertNoteRequest {
    /// Reject missing or blank required fields before touching storage.
    pub fn validate(&self) -> Result<()> {
        if self.video_id.trim().is_empty() {
            return Err(Error::InvalidInput("videoId is required".to_string()));
        }
        if self.transcript.trim().is_empty() {
            return Err(Error::InvalidInput("transcript is required".to_string()));
        }
        if !self.overall && self.timestamp.is_none() {
            return Err(Error::InvalidInput(
                "timestamp is required for non-overall notes".to_string(),
            ));
        }
        Ok(())
    }
}

/// Request for deleting a note.
#[derive(Debug, Clone)]
pub struct DeleteNoteRequest {
    pub video_id: String,
    pub timestamp: Option<f64>,
    pub overall: bool,
}

impl DeleteNoteRequest {
    pub fn validate(&self) -> Result<()> {
        if self.video_id.trim().is_empty() {
            return Err(Error::InvalidInput("videoId is required".to_string()));
        }
        if !self.overall && self.timestamp.is_none() {
            return Err(Error::InvalidInput(
                "timestamp is required for non-overall deletes".to_string(),
            ));
        }
        Ok(())
    }
}

/// Repository for note operations, keyed by (videoId, timestamp-or-overall).
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// All notes for a video in display order. Empty for unknown videos.
    async fn list(&self, video_id: &str) -> Result<Vec<NoteEntry>>;

    /// Insert a note, or replace the transcript of the entry matching the
    /// same key. Returns the resulting entry.
    async fn upsert(&self, req: UpsertNoteRequest) -> Result<NoteEntry>;

    /// Edit the transcript of an existing entry. Fails with
    /// [`Error::NotFound`] rather than creating one.
    async fn update(&self, req: UpsertNoteRequest) -> Result<NoteEntry>;

    /// Remove the entry (or all overall entries) matching the key.
    async fn delete(&self, req: DeleteNoteRequest) -> Result<()>;
}
