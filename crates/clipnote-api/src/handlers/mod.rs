//! HTTP handler modules.

pub mod notes;
