pub mod claim;
pub mod health;
pub mod intervention;
pub mod notification;
pub mod partnership;
pub mod transfer;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /interventions                       create (admin), list
/// /interventions/{id}                  get
///
/// /claims                              create, list
///
/// /transfers                           create, list
/// /transfers/{id}/approve              target-domain approval
/// /transfers/{id}/reject               target-domain rejection
///
/// /partnerships                        request, list
/// /partnerships/active                 activity check for a domain pair
/// /partnerships/{id}/status            accept / decline / deactivate
///
/// /notifications                       list
/// /notifications/unread-count          unread counter
/// /notifications/{id}/read             mark read
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/interventions", intervention::router())
        .nest("/claims", claim::router())
        .nest("/transfers", transfer::router())
        .nest("/partnerships", partnership::router())
        .nest("/notifications", notification::router())
}
