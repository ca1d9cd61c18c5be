//! Partnership entity models and DTOs.

use scope3_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `partnerships` table.
///
/// The pair is conceptually unordered (a unique index covers both
/// orderings); the columns record who initiated the request so that only
/// the receiving side may accept or decline it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Partnership {
    pub id: DbId,
    pub requester_domain_id: DbId,
    pub partner_domain_id: DbId,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for requesting a partnership.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestPartnership {
    pub partner_domain_id: DbId,
}

/// Request body for accepting/declining/deactivating a partnership.
#[derive(Debug, Clone, Deserialize)]
pub struct SetPartnershipStatus {
    pub status: String,
}
