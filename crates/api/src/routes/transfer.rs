//! Route definitions for transfers.

use axum::routing::post;
use axum::Router;

use crate::handlers::transfer;
use crate::state::AppState;

/// Transfer routes, nested under `/transfers`.
///
/// ```text
/// POST   /                create_transfer
/// GET    /                list_transfers
/// POST   /{id}/approve    approve_transfer (target domain)
/// POST   /{id}/reject     reject_transfer (target domain)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(transfer::create_transfer).get(transfer::list_transfers),
        )
        .route("/{id}/approve", post(transfer::approve_transfer))
        .route("/{id}/reject", post(transfer::reject_transfer))
}
