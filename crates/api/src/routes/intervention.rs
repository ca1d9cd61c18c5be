//! Route definitions for interventions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::intervention;
use crate::state::AppState;

/// Intervention routes, nested under `/interventions`.
///
/// ```text
/// POST   /          create_intervention (admin only)
/// GET    /          list_interventions
/// GET    /{id}      get_intervention
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(intervention::create_intervention).get(intervention::list_interventions),
        )
        .route("/{id}", get(intervention::get_intervention))
}
