//! Scope3 domain core.
//!
//! Shared types, status constants, the error taxonomy, and the external
//! collaborator seams (statement renderer) used by the db, events, and api
//! crates. This crate has no I/O of its own.

pub mod claim;
pub mod error;
pub mod events;
pub mod partnership;
pub mod statement;
pub mod transfer;
pub mod types;
