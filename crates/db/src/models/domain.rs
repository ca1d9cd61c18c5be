//! Minimal projection of the external account directory.
//!
//! Account management lives outside this service; the `domains` table only
//! exists as the foreign-key target for ledger rows and as the lookup for
//! notification email addresses.

use scope3_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `domains` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Domain {
    pub id: DbId,
    pub name: String,
    pub contact_email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a domain projection row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDomain {
    pub name: String,
    pub contact_email: Option<String>,
}
