//! Handlers for in-app notifications.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use scope3_core::error::CoreError;
use scope3_core::types::DbId;
use scope3_db::repositories::NotificationRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthDomain;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum notifications returned per listing.
const LIST_LIMIT: i64 = 100;

/// GET /api/v1/notifications
pub async fn list_notifications(
    auth: AuthDomain,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let notifications =
        NotificationRepo::list_for_domain(&state.pool, auth.domain_id, LIST_LIMIT).await?;
    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// Response payload for the unread counter.
#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    auth: AuthDomain,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let unread = NotificationRepo::unread_count(&state.pool, auth.domain_id).await?;
    Ok(Json(DataResponse {
        data: UnreadCount { unread },
    }))
}

/// POST /api/v1/notifications/{id}/read
pub async fn mark_read(
    auth: AuthDomain,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let notification = NotificationRepo::mark_read(&state.pool, id, auth.domain_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Notification",
                id: id.to_string(),
            })
        })?;
    Ok(Json(DataResponse { data: notification }))
}
