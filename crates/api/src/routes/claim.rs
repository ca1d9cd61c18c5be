//! Route definitions for claims.

use axum::routing::post;
use axum::Router;

use crate::handlers::claim;
use crate::state::AppState;

/// Claim routes, nested under `/claims`.
///
/// ```text
/// POST   /          create_claim
/// GET    /          list_claims
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(claim::create_claim).get(claim::list_claims))
}
