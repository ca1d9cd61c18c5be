//! Route definitions for notifications.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Notification routes, nested under `/notifications`.
///
/// ```text
/// GET    /                 list_notifications
/// GET    /unread-count     unread_count
/// POST   /{id}/read        mark_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list_notifications))
        .route("/unread-count", get(notification::unread_count))
        .route("/{id}/read", post(notification::mark_read))
}
