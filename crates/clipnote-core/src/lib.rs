//! # clipnote-core
//!
//! Core types, traits, and abstractions for the clipnote annotation backend.
//!
//! This crate provides the data model and trait definitions that the storage
//! and API crates depend on.

pub mod error;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::{sort_notes, NoteCollection, NoteEntry};
pub use traits::{DeleteNoteRequest, NoteRepository, UpsertNoteRequest};
