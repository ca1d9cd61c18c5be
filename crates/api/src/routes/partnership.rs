//! Route definitions for partnerships.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::partnership;
use crate::state::AppState;

/// Partnership routes, nested under `/partnerships`.
///
/// ```text
/// POST   /               request_partnership
/// GET    /               list_partnerships
/// GET    /active         is_partnership_active
/// POST   /{id}/status    set_partnership_status (receiving domain)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(partnership::request_partnership).get(partnership::list_partnerships),
        )
        .route("/active", get(partnership::is_partnership_active))
        .route("/{id}/status", post(partnership::set_partnership_status))
}
