//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Read-side join structs where list endpoints need intervention context

pub mod claim;
pub mod domain;
pub mod intervention;
pub mod notification;
pub mod partnership;
pub mod transfer;
