//! Claim entity models and DTOs.

use scope3_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `claims` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Claim {
    pub id: DbId,
    pub intervention_id: DbId,
    pub domain_id: DbId,
    pub amount: f64,
    pub vintage: i32,
    pub status: String,
    pub expiry_date: Timestamp,
    pub statement_key: Option<String>,
    pub last_warned_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Repository-level input for inserting a claim. The intervention has
/// already been resolved by the handler; `vintage` is copied from it.
#[derive(Debug, Clone)]
pub struct CreateClaim {
    pub intervention_id: DbId,
    pub domain_id: DbId,
    pub amount: f64,
    pub vintage: i32,
}

/// Request body for the claim creation endpoint. The intervention may be
/// referenced by internal id or external identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClaimRequest {
    pub intervention_ref: String,
    pub amount: f64,
}

/// A claim joined with its intervention, for domain-scoped listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClaimWithIntervention {
    pub id: DbId,
    pub intervention_id: DbId,
    pub intervention_name: String,
    pub intervention_external_id: Option<String>,
    pub domain_id: DbId,
    pub amount: f64,
    pub vintage: i32,
    pub status: String,
    pub expiry_date: Timestamp,
    pub statement_key: Option<String>,
    pub created_at: Timestamp,
}
