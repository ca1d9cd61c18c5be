//! Repository for the `domains` projection table.

use scope3_core::types::DbId;
use sqlx::PgPool;

use crate::models::domain::{CreateDomain, Domain};

/// Column list for domains queries.
const COLUMNS: &str = "id, name, contact_email, created_at, updated_at";

/// Read/insert operations for the domain projection.
pub struct DomainRepo;

impl DomainRepo {
    /// Insert a domain projection row.
    pub async fn create(pool: &PgPool, input: &CreateDomain) -> Result<Domain, sqlx::Error> {
        let query = format!(
            "INSERT INTO domains (name, contact_email)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Domain>(&query)
            .bind(&input.name)
            .bind(&input.contact_email)
            .fetch_one(pool)
            .await
    }

    /// Find a domain by its id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Domain>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM domains WHERE id = $1");
        sqlx::query_as::<_, Domain>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
