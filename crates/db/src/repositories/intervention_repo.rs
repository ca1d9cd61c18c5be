//! Repository for the `interventions` table, including the balance store.
//!
//! The `remaining_amount` column is the single most-contended resource in
//! the system. [`InterventionRepo::reserve`] and
//! [`InterventionRepo::release`] are the only two code paths that write it;
//! both are single conditional UPDATE statements, so two concurrent
//! reservations against the same row cannot both succeed when only one
//! amount's worth is available.

use scope3_core::types::DbId;
use sqlx::PgPool;

use crate::models::intervention::{CreateIntervention, Intervention};

/// Column list for interventions queries.
const COLUMNS: &str = "id, domain_id, external_id, name, total_amount, remaining_amount, \
    vintage, status, created_at, updated_at";

/// Provides CRUD and balance operations for interventions.
pub struct InterventionRepo;

impl InterventionRepo {
    /// Insert a new intervention with `remaining_amount = total_amount`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateIntervention,
    ) -> Result<Intervention, sqlx::Error> {
        let query = format!(
            "INSERT INTO interventions
                (domain_id, external_id, name, total_amount, remaining_amount, vintage)
             VALUES ($1, $2, $3, $4, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Intervention>(&query)
            .bind(input.domain_id)
            .bind(&input.external_id)
            .bind(&input.name)
            .bind(input.total_amount)
            .bind(input.vintage)
            .fetch_one(pool)
            .await
    }

    /// Find an intervention by its internal id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Intervention>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM interventions WHERE id = $1");
        sqlx::query_as::<_, Intervention>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve an intervention by internal id (numeric reference) or by
    /// external identifier (anything else).
    pub async fn find_by_ref(
        pool: &PgPool,
        reference: &str,
    ) -> Result<Option<Intervention>, sqlx::Error> {
        if let Ok(id) = reference.parse::<DbId>() {
            return Self::find_by_id(pool, id).await;
        }
        let query = format!("SELECT {COLUMNS} FROM interventions WHERE external_id = $1");
        sqlx::query_as::<_, Intervention>(&query)
            .bind(reference)
            .fetch_optional(pool)
            .await
    }

    /// List interventions owned by a domain, newest first.
    pub async fn list_for_domain(
        pool: &PgPool,
        domain_id: DbId,
    ) -> Result<Vec<Intervention>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM interventions
             WHERE domain_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Intervention>(&query)
            .bind(domain_id)
            .fetch_all(pool)
            .await
    }

    /// Atomically reserve `amount` against the intervention's remaining
    /// balance. Returns the new remaining balance, or `None` when the row
    /// does not exist or holds less than `amount`.
    ///
    /// The availability check lives in the WHERE clause of a single UPDATE,
    /// so the row lock taken by one reservation serializes any concurrent
    /// reservation on the same intervention. Callers compose this with
    /// their own inserts by passing the transaction executor.
    pub async fn reserve<'e>(
        executor: impl sqlx::PgExecutor<'e>,
        intervention_id: DbId,
        amount: f64,
    ) -> Result<Option<f64>, sqlx::Error> {
        let row: Option<(f64,)> = sqlx::query_as(
            "UPDATE interventions
             SET remaining_amount = remaining_amount - $2, updated_at = now()
             WHERE id = $1 AND remaining_amount >= $2
             RETURNING remaining_amount",
        )
        .bind(intervention_id)
        .bind(amount)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(|(remaining,)| remaining))
    }

    /// Restore a previously reserved `amount` onto the remaining balance
    /// (compensation for a rejected transfer). Returns the new remaining
    /// balance, or `None` when the restore would exceed `total_amount`.
    pub async fn release<'e>(
        executor: impl sqlx::PgExecutor<'e>,
        intervention_id: DbId,
        amount: f64,
    ) -> Result<Option<f64>, sqlx::Error> {
        let row: Option<(f64,)> = sqlx::query_as(
            "UPDATE interventions
             SET remaining_amount = remaining_amount + $2, updated_at = now()
             WHERE id = $1 AND remaining_amount + $2 <= total_amount
             RETURNING remaining_amount",
        )
        .bind(intervention_id)
        .bind(amount)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(|(remaining,)| remaining))
    }

    /// Read the current remaining balance for an intervention.
    pub async fn get_available<'e>(
        executor: impl sqlx::PgExecutor<'e>,
        intervention_id: DbId,
    ) -> Result<Option<f64>, sqlx::Error> {
        let row: Option<(f64,)> =
            sqlx::query_as("SELECT remaining_amount FROM interventions WHERE id = $1")
                .bind(intervention_id)
                .fetch_optional(executor)
                .await?;
        Ok(row.map(|(remaining,)| remaining))
    }
}
