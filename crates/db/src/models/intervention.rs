//! Intervention entity models and DTOs.

use scope3_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `interventions` table.
///
/// `total_amount` is fixed at creation; `remaining_amount` is the mutable
/// balance decremented by claim and transfer creation and restored by
/// transfer rejection. Claim expiry never restores it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Intervention {
    pub id: DbId,
    pub domain_id: DbId,
    pub external_id: Option<String>,
    pub name: String,
    pub total_amount: f64,
    pub remaining_amount: f64,
    pub vintage: i32,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a verified intervention.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntervention {
    pub domain_id: DbId,
    pub external_id: Option<String>,
    pub name: String,
    pub total_amount: f64,
    pub vintage: i32,
}
