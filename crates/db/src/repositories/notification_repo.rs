//! Repository for the `notifications` table.

use scope3_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{CreateNotification, Notification};

/// Column list for notifications queries.
const COLUMNS: &str =
    "id, domain_id, event_type, message, metadata, is_read, read_at, created_at";

/// Provides persistence and read tracking for in-app notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a new notification, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (domain_id, event_type, message, metadata)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(input.domain_id)
            .bind(&input.event_type)
            .bind(&input.message)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    /// List notifications for a domain, newest first.
    pub async fn list_for_domain(
        pool: &PgPool,
        domain_id: DbId,
        limit: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE domain_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(domain_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Mark a notification as read. Scoped to the owning domain so one
    /// domain cannot touch another's notifications.
    pub async fn mark_read(
        pool: &PgPool,
        id: DbId,
        domain_id: DbId,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!(
            "UPDATE notifications
             SET is_read = TRUE, read_at = now()
             WHERE id = $1 AND domain_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .bind(domain_id)
            .fetch_optional(pool)
            .await
    }

    /// Count unread notifications for a domain.
    pub async fn unread_count(pool: &PgPool, domain_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE domain_id = $1 AND is_read = FALSE",
        )
        .bind(domain_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
