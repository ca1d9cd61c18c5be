//! Notification entity models.

use scope3_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub domain_id: DbId,
    pub event_type: String,
    pub message: String,
    pub metadata: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Repository-level input for inserting a notification.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub domain_id: DbId,
    pub event_type: String,
    pub message: String,
    pub metadata: serde_json::Value,
}
