//! # clipnote-store
//!
//! File-backed persistence for clipnote. The whole note collection lives in
//! one pretty-printed JSON document that is re-read and rewritten around
//! every operation.

pub mod notes;

pub use notes::FileNoteStore;
