//! Data model for clipnote annotations.
//!
//! A note is either tied to a playback timestamp (seconds into the video) or
//! marked `overall`, covering the whole video. Wire and on-disk field names
//! are camelCase and form the persistence contract, so serde renames are
//! load-bearing here.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One annotation attached to a video.
///
/// Invariant: `timestamp` is `None` exactly when `overall` is true. A video
/// holds at most one entry per distinct timestamp and at most one overall
/// entry; upserts replace on conflict rather than duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEntry {
    /// Position in the video, in seconds. `None` for overall notes.
    pub timestamp: Option<f64>,
    /// The annotation text.
    pub transcript: String,
    /// Video-level note rather than a timestamped one.
    #[serde(default)]
    pub overall: bool,
    /// Creation time (UTC). Replaced when an upsert overwrites the entry.
    pub created_at: DateTime<Utc>,
    /// Set when the transcript is edited via update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
}

impl NoteEntry {
    /// Key match used by upsert, update, and delete.
    ///
    /// An overall key matches any overall entry for the video; a timestamped
    /// key matches on exact float equality and never matches an overall
    /// entry.
    pub fn matches(&self, timestamp: Option<f64>, overall: bool) -> bool {
        if overall {
            self.overall
        } else {
            !self.overall && self.timestamp == timestamp
        }
    }
}

/// The whole persisted state: videoId → ordered notes.
pub type NoteCollection = BTreeMap<String, Vec<NoteEntry>>;

/// Restore the ordering invariant for one video's notes: overall
/// (null-timestamp) entries first, then ascending timestamp.
///
/// Stable sort, so entries the comparator considers equal keep their
/// relative order.
pub fn sort_notes(entries: &mut [NoteEntry]) {
    entries.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    });
}
