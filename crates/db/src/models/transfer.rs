//! Transfer entity models and DTOs.

use scope3_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `transfers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transfer {
    pub id: DbId,
    pub intervention_id: DbId,
    pub source_domain_id: DbId,
    pub target_domain_id: DbId,
    pub amount: f64,
    pub status: String,
    pub notes: Option<String>,
    pub created_by_id: Option<DbId>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Repository-level input for inserting a transfer.
#[derive(Debug, Clone)]
pub struct CreateTransfer {
    pub intervention_id: DbId,
    pub source_domain_id: DbId,
    pub target_domain_id: DbId,
    pub amount: f64,
    pub notes: Option<String>,
    pub created_by_id: Option<DbId>,
}

/// Request body for the transfer creation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransferRequest {
    pub intervention_ref: String,
    pub target_domain_id: DbId,
    pub amount: f64,
    pub notes: Option<String>,
}

/// A transfer joined with its intervention, for domain-scoped listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransferWithIntervention {
    pub id: DbId,
    pub intervention_id: DbId,
    pub intervention_name: String,
    pub source_domain_id: DbId,
    pub target_domain_id: DbId,
    pub amount: f64,
    pub status: String,
    pub notes: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
