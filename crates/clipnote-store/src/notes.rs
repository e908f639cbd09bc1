//! JSON-file note store.
//!
//! `FileNoteStore` keeps the full collection in a single JSON file and
//! performs a whole-file read-modify-write cycle per mutation. An async
//! mutex serializes those cycles, so concurrent requests in one process
//! cannot overwrite each other's writes. Concurrent writers from other
//! processes remain unguarded; the intended deployment is a single local
//! server owning the file.
//!
//! Recovery policy: a missing or unparseable data file loads as an empty
//! collection. Corruption is logged at WARN and never surfaced to callers.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use clipnote_core::{
    sort_notes, DeleteNoteRequest, Error, NoteCollection, NoteEntry, NoteRepository, Result,
    UpsertNoteRequest,
};

/// JSON-file-backed implementation of [`NoteRepository`].
pub struct FileNoteStore {
    data_path: PathBuf,
    /// Guards the read-modify-write cycle of every mutation.
    write_lock: Mutex<()>,
}

impl FileNoteStore {
    /// Create a store persisting to the given file path. The file and its
    /// parent directory are created lazily on first write.
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing JSON file.
    pub fn data_path(&self) -> &std::path::Path {
        &self.data_path
    }

    /// Load the whole collection from disk.
    ///
    /// Missing file → empty collection. Corrupt JSON → empty collection
    /// with a WARN log; the next successful write replaces the bad file.
    async fn load(&self) -> Result<NoteCollection> {
        let raw = match fs::read_to_string(&self.data_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(NoteCollection::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(notes) => Ok(notes),
            Err(e) => {
                warn!(
                    data_path = %self.data_path.display(),
                    error = %e,
                    "note store: corrupt data file, starting from empty collection"
                );
                Ok(NoteCollection::new())
            }
        }
    }

    /// Write the whole collection back, pretty-printed.
    async fn persist(&self, notes: &NoteCollection) -> Result<()> {
        if let Some(parent) = self.data_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let raw = serde_json::to_string_pretty(notes)?;
        fs::write(&self.data_path, raw).await?;
        debug!(
            data_path = %self.data_path.display(),
            video_count = notes.len(),
            "note store: persisted collection"
        );
        Ok(())
    }
}

#[async_trait]
impl NoteRepository for FileNoteStore {
    async fn list(&self, video_id: &str) -> Result<Vec<NoteEntry>> {
        let notes = self.load().await?;
        Ok(notes.get(video_id).cloned().unwrap_or_default())
    }

    async fn upsert(&self, req: UpsertNoteRequest) -> Result<NoteEntry> {
        req.validate()?;
        let _guard = self.write_lock.lock().await;

        let mut notes = self.load().await?;
        let entries = notes.entry(req.video_id.clone()).or_default();
        let now = Utc::now();
        // Overall notes carry no timestamp even if the caller sent one.
        let timestamp = if req.overall { None } else { req.timestamp };

        let entry = match entries
            .iter_mut()
            .find(|e| e.matches(timestamp, req.overall))
        {
            Some(existing) => {
                existing.transcript = req.transcript;
                existing.created_at = now;
                existing.clone()
            }
            None => {
                let entry = NoteEntry {
                    timestamp,
                    transcript: req.transcript,
                    overall: req.overall,
                    created_at: now,
                    edited_at: None,
                };
                entries.push(entry.clone());
                entry
            }
        };
        sort_notes(entries);

        self.persist(&notes).await?;
        debug!(
            video_id = %req.video_id,
            overall = req.overall,
            "note store: upserted note"
        );
        Ok(entry)
    }

    async fn update(&self, req: UpsertNoteRequest) -> Result<NoteEntry> {
        req.validate()?;
        let _guard = self.write_lock.lock().await;

        let mut notes = self.load().await?;
        let entries = notes.get_mut(&req.video_id).ok_or(Error::NotFound)?;
        let timestamp = if req.overall { None } else { req.timestamp };

        let entry = entries
            .iter_mut()
            .find(|e| e.matches(timestamp, req.overall))
            .ok_or(Error::NotFound)?;
        entry.transcript = req.transcript;
        entry.edited_at = Some(Utc::now());
        let entry = entry.clone();

        self.persist(&notes).await?;
        debug!(video_id = %req.video_id, "note store: updated note");
        Ok(entry)
    }

    async fn delete(&self, req: DeleteNoteRequest) -> Result<()> {
        req.validate()?;
        let _guard = self.write_lock.lock().await;

        let mut notes = self.load().await?;
        let entries = notes.get_mut(&req.video_id).ok_or(Error::NotFound)?;
        let timestamp = if req.overall { None } else { req.timestamp };

        let before = entries.len();
        entries.retain(|e| !e.matches(timestamp, req.overall));
        let removed = before - entries.len();
        if removed == 0 {
            return Err(Error::NotFound);
        }

        self.persist(&notes).await?;
        debug!(
            video_id = %req.video_id,
            removed,
            "note store: deleted note"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileNoteStore) {
        let dir = TempDir::new().unwrap();
        let store = FileNoteStore::new(dir.path().join("notes.json"));
        (dir, store)
    }

    fn upsert_req(video_id: &str, timestamp: f64, transcript: &str) -> UpsertNoteRequest {
        UpsertNoteRequest {
            video_id: video_id.to_string(),
            timestamp: Some(timestamp),
            transcript: transcript.to_string(),
            overall: false,
        }
    }

    fn overall_req(video_id: &str, transcript: &str) -> UpsertNoteRequest {
        UpsertNoteRequest {
            video_id: video_id.to_string(),
            timestamp: None,
            transcript: transcript.to_string(),
            overall: true,
        }
    }

    #[tokio::test]
    async fn test_list_unknown_video_is_empty() {
        let (_dir, store) = store();
        assert!(store.list("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_new_timestamp_appends() {
        let (_dir, store) = store();
        store.upsert(upsert_req("v1", 12.5, "hello")).await.unwrap();
        store.upsert(upsert_req("v1", 40.0, "later")).await.unwrap();

        let notes = store.list("v1").await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].timestamp, Some(12.5));
        assert_eq!(notes[0].transcript, "hello");
        assert!(!notes[0].overall);
    }

    #[tokio::test]
    async fn test_upsert_existing_timestamp_replaces_in_place() {
        let (_dir, store) = store();
        let first = store.upsert(upsert_req("v1", 12.5, "old")).await.unwrap();
        let second = store.upsert(upsert_req("v1", 12.5, "new")).await.unwrap();

        let notes = store.list("v1").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].transcript, "new");
        assert!(second.created_at >= first.created_at);
    }

    #[tokio::test]
    async fn test_upsert_overall_twice_keeps_one_entry() {
        let (_dir, store) = store();
        store.upsert(overall_req("v1", "summary")).await.unwrap();
        store.upsert(overall_req("v1", "revised")).await.unwrap();

        let notes = store.list("v1").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].overall);
        assert_eq!(notes[0].timestamp, None);
        assert_eq!(notes[0].transcript, "revised");
    }

    #[tokio::test]
    async fn test_upsert_overall_ignores_supplied_timestamp() {
        let (_dir, store) = store();
        let mut req = overall_req("v1", "summary");
        req.timestamp = Some(99.0);
        let entry = store.upsert(req).await.unwrap();
        assert_eq!(entry.timestamp, None);
    }

    #[tokio::test]
    async fn test_entries_sorted_overall_first_then_ascending() {
        let (_dir, store) = store();
        store.upsert(upsert_req("v1", 30.0, "c")).await.unwrap();
        store.upsert(overall_req("v1", "summary")).await.unwrap();
        store.upsert(upsert_req("v1", 2.5, "a")).await.unwrap();

        let notes = store.list("v1").await.unwrap();
        let timestamps: Vec<_> = notes.iter().map(|n| n.timestamp).collect();
        assert_eq!(timestamps, vec![None, Some(2.5), Some(30.0)]);
    }

    #[tokio::test]
    async fn test_upsert_rejects_missing_timestamp_without_overall() {
        let (_dir, store) = store();
        let mut req = upsert_req("v1", 0.0, "hello");
        req.timestamp = None;
        assert!(matches!(
            store.upsert(req).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_update_edits_transcript_and_stamps_edited_at() {
        let (_dir, store) = store();
        store.upsert(upsert_req("v1", 12.5, "draft")).await.unwrap();
        let updated = store.update(upsert_req("v1", 12.5, "final")).await.unwrap();
        assert_eq!(updated.transcript, "final");
        assert!(updated.edited_at.is_some());

        let notes = store.list("v1").await.unwrap();
        assert_eq!(notes[0].transcript, "final");
        assert!(notes[0].edited_at.is_some());
    }

    #[tokio::test]
    async fn test_update_nonexistent_is_not_found_and_leaves_storage_alone() {
        let (_dir, store) = store();
        store.upsert(upsert_req("v1", 12.5, "keep")).await.unwrap();

        let err = store.update(upsert_req("v1", 99.0, "nope")).await;
        assert!(matches!(err, Err(Error::NotFound)));
        let err = store.update(upsert_req("other", 12.5, "nope")).await;
        assert!(matches!(err, Err(Error::NotFound)));

        let notes = store.list("v1").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].transcript, "keep");
        assert!(notes[0].edited_at.is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_the_match() {
        let (_dir, store) = store();
        store.upsert(upsert_req("v1", 12.5, "a")).await.unwrap();
        store.upsert(upsert_req("v1", 40.0, "b")).await.unwrap();

        store
            .delete(DeleteNoteRequest {
                video_id: "v1".to_string(),
                timestamp: Some(12.5),
                overall: false,
            })
            .await
            .unwrap();

        let notes = store.list("v1").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].timestamp, Some(40.0));
    }

    #[tokio::test]
    async fn test_delete_overall_leaves_timestamped_notes() {
        let (_dir, store) = store();
        store.upsert(overall_req("v1", "summary")).await.unwrap();
        store.upsert(upsert_req("v1", 12.5, "a")).await.unwrap();

        store
            .delete(DeleteNoteRequest {
                video_id: "v1".to_string(),
                timestamp: None,
                overall: true,
            })
            .await
            .unwrap();

        let notes = store.list("v1").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].timestamp, Some(12.5));
    }

    #[tokio::test]
    async fn test_timestamped_delete_never_removes_overall_note() {
        let (_dir, store) = store();
        store.upsert(overall_req("v1", "summary")).await.unwrap();

        let err = store
            .delete(DeleteNoteRequest {
                video_id: "v1".to_string(),
                timestamp: Some(12.5),
                overall: false,
            })
            .await;
        assert!(matches!(err, Err(Error::NotFound)));
        assert_eq!(store.list("v1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_not_found() {
        let (_dir, store) = store();
        let err = store
            .delete(DeleteNoteRequest {
                video_id: "v1".to_string(),
                timestamp: Some(1.0),
                overall: false,
            })
            .await;
        assert!(matches!(err, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn test_corrupt_data_file_loads_as_empty() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("notes.json"), "{ not json").unwrap();

        assert!(store.list("v1").await.unwrap().is_empty());

        // Next write replaces the corrupt file with a valid one.
        store.upsert(upsert_req("v1", 1.0, "fresh")).await.unwrap();
        let notes = store.list("v1").await.unwrap();
        assert_eq!(notes.len(), 1);
    }

    #[tokio::test]
    async fn test_persisted_file_is_pretty_printed_camel_case() {
        let (dir, store) = store();
        store.upsert(upsert_req("v1", 12.5, "hello")).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("notes.json")).unwrap();
        assert!(raw.contains('\n'));
        assert!(raw.contains("\"createdAt\""));
        assert!(raw.contains("\"v1\""));

        let parsed: NoteCollection = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["v1"].len(), 1);
    }

    #[tokio::test]
    async fn test_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        {
            let store = FileNoteStore::new(&path);
            store.upsert(upsert_req("v1", 5.0, "persist")).await.unwrap();
        }
        let reopened = FileNoteStore::new(&path);
        let notes = reopened.list("v1").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].transcript, "persist");
    }
}
