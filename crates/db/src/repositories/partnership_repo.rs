//! Repository for the `partnerships` table: the partnership registry.

use scope3_core::partnership::{
    PARTNERSHIP_STATUS_ACTIVE, PARTNERSHIP_STATUS_INACTIVE, PARTNERSHIP_STATUS_PENDING,
};
use scope3_core::types::DbId;
use sqlx::PgPool;

use crate::models::partnership::Partnership;

/// Column list for partnerships queries.
const COLUMNS: &str =
    "id, requester_domain_id, partner_domain_id, status, created_at, updated_at";

/// Provides lifecycle and lookup operations for partnerships.
pub struct PartnershipRepo;

impl PartnershipRepo {
    /// Insert a new pending partnership request.
    pub async fn create(
        pool: &PgPool,
        requester_domain_id: DbId,
        partner_domain_id: DbId,
    ) -> Result<Partnership, sqlx::Error> {
        let query = format!(
            "INSERT INTO partnerships (requester_domain_id, partner_domain_id, status)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Partnership>(&query)
            .bind(requester_domain_id)
            .bind(partner_domain_id)
            .bind(PARTNERSHIP_STATUS_PENDING)
            .fetch_one(pool)
            .await
    }

    /// Find a partnership by its id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Partnership>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM partnerships WHERE id = $1");
        sqlx::query_as::<_, Partnership>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the partnership between two domains, regardless of which side
    /// initiated it.
    pub async fn find_between(
        pool: &PgPool,
        domain_a: DbId,
        domain_b: DbId,
    ) -> Result<Option<Partnership>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM partnerships
             WHERE (requester_domain_id = $1 AND partner_domain_id = $2)
                OR (requester_domain_id = $2 AND partner_domain_id = $1)"
        );
        sqlx::query_as::<_, Partnership>(&query)
            .bind(domain_a)
            .bind(domain_b)
            .fetch_optional(pool)
            .await
    }

    /// Whether an active partnership exists between two domains. This is
    /// the gate every transfer creation depends on.
    pub async fn is_active(
        pool: &PgPool,
        domain_a: DbId,
        domain_b: DbId,
    ) -> Result<bool, sqlx::Error> {
        let partnership = Self::find_between(pool, domain_a, domain_b).await?;
        Ok(partnership.is_some_and(|p| p.status == PARTNERSHIP_STATUS_ACTIVE))
    }

    /// Re-open an inactive partnership as a fresh pending request from
    /// `requester_domain_id`. Keyed on `status = 'inactive'` so a
    /// concurrent reactivation cannot apply twice.
    pub async fn reactivate(
        pool: &PgPool,
        id: DbId,
        requester_domain_id: DbId,
        partner_domain_id: DbId,
    ) -> Result<Option<Partnership>, sqlx::Error> {
        let query = format!(
            "UPDATE partnerships
             SET requester_domain_id = $2, partner_domain_id = $3,
                 status = $4, updated_at = now()
             WHERE id = $1 AND status = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Partnership>(&query)
            .bind(id)
            .bind(requester_domain_id)
            .bind(partner_domain_id)
            .bind(PARTNERSHIP_STATUS_PENDING)
            .bind(PARTNERSHIP_STATUS_INACTIVE)
            .fetch_optional(pool)
            .await
    }

    /// Set a partnership's status, keyed on the expected current status.
    /// Returns `None` when the row moved out of `expected` concurrently.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        new_status: &str,
    ) -> Result<Option<Partnership>, sqlx::Error> {
        let query = format!(
            "UPDATE partnerships
             SET status = $2, updated_at = now()
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Partnership>(&query)
            .bind(id)
            .bind(new_status)
            .bind(expected)
            .fetch_optional(pool)
            .await
    }

    /// List partnerships involving a domain, newest first.
    pub async fn list_for_domain(
        pool: &PgPool,
        domain_id: DbId,
    ) -> Result<Vec<Partnership>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM partnerships
             WHERE requester_domain_id = $1 OR partner_domain_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Partnership>(&query)
            .bind(domain_id)
            .fetch_all(pool)
            .await
    }
}
