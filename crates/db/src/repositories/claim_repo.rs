//! Repository for the `claims` table: the claim allocator and the queries
//! backing the expiration sweeper.

use scope3_core::claim::{CLAIM_STATUS_ACTIVE, CLAIM_STATUS_EXPIRED, CLAIM_STATUS_PENDING_PDF};
use scope3_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::claim::{Claim, ClaimWithIntervention, CreateClaim};
use crate::repositories::InterventionRepo;

/// Column list for claims queries.
const COLUMNS: &str = "id, intervention_id, domain_id, amount, vintage, status, \
    expiry_date, statement_key, last_warned_at, created_at, updated_at";

/// Outcome of an attempted claim allocation.
#[derive(Debug)]
pub enum ClaimOutcome {
    /// The balance was reserved and the claim row committed.
    Created(Claim),
    /// The intervention holds less than the requested amount. Nothing was
    /// written; `available` is the balance observed inside the transaction.
    Insufficient { available: f64 },
    /// The intervention row disappeared between resolution and allocation.
    InterventionMissing,
}

/// Provides allocation, listing, and sweep operations for claims.
pub struct ClaimRepo;

impl ClaimRepo {
    /// Allocate a claim: reserve the balance and insert the claim row in a
    /// single transaction. The reservation re-validates availability inside
    /// the transaction, so a stale check at the API boundary cannot cause
    /// over-allocation.
    pub async fn create(
        pool: &PgPool,
        input: &CreateClaim,
        expiry_date: Timestamp,
    ) -> Result<ClaimOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let reserved =
            InterventionRepo::reserve(&mut *tx, input.intervention_id, input.amount).await?;
        if reserved.is_none() {
            // Distinguish insufficiency from a missing row; either way the
            // transaction is dropped without committing.
            let available =
                InterventionRepo::get_available(&mut *tx, input.intervention_id).await?;
            return Ok(match available {
                Some(available) => ClaimOutcome::Insufficient { available },
                None => ClaimOutcome::InterventionMissing,
            });
        }

        let query = format!(
            "INSERT INTO claims (intervention_id, domain_id, amount, vintage, status, expiry_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let claim = sqlx::query_as::<_, Claim>(&query)
            .bind(input.intervention_id)
            .bind(input.domain_id)
            .bind(input.amount)
            .bind(input.vintage)
            .bind(CLAIM_STATUS_ACTIVE)
            .bind(expiry_date)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ClaimOutcome::Created(claim))
    }

    /// Find a claim by its id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Claim>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM claims WHERE id = $1");
        sqlx::query_as::<_, Claim>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List claims made by a domain, joined with intervention context,
    /// newest first.
    pub async fn list_for_domain(
        pool: &PgPool,
        domain_id: DbId,
    ) -> Result<Vec<ClaimWithIntervention>, sqlx::Error> {
        sqlx::query_as::<_, ClaimWithIntervention>(
            "SELECT
                c.id, c.intervention_id,
                i.name AS intervention_name,
                i.external_id AS intervention_external_id,
                c.domain_id, c.amount, c.vintage, c.status, c.expiry_date,
                c.statement_key, c.created_at
             FROM claims c
             JOIN interventions i ON i.id = c.intervention_id
             WHERE c.domain_id = $1
             ORDER BY c.created_at DESC",
        )
        .bind(domain_id)
        .fetch_all(pool)
        .await
    }

    /// Attach the rendered statement artifact and restore the claim to
    /// `active` (no-op for claims already carrying an artifact).
    pub async fn attach_statement(
        pool: &PgPool,
        id: DbId,
        statement_key: &str,
    ) -> Result<Option<Claim>, sqlx::Error> {
        let query = format!(
            "UPDATE claims
             SET statement_key = $2, status = $3, updated_at = now()
             WHERE id = $1 AND statement_key IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Claim>(&query)
            .bind(id)
            .bind(statement_key)
            .bind(CLAIM_STATUS_ACTIVE)
            .fetch_optional(pool)
            .await
    }

    /// Downgrade a claim whose statement rendering failed. The claim and
    /// its balance reservation stay committed; the retry task picks it up.
    pub async fn mark_statement_pending(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Claim>, sqlx::Error> {
        let query = format!(
            "UPDATE claims
             SET status = $2, updated_at = now()
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Claim>(&query)
            .bind(id)
            .bind(CLAIM_STATUS_PENDING_PDF)
            .bind(CLAIM_STATUS_ACTIVE)
            .fetch_optional(pool)
            .await
    }

    /// Claims waiting for a statement artifact, oldest first.
    pub async fn list_statement_pending(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<Claim>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM claims
             WHERE status = $1
             ORDER BY created_at ASC
             LIMIT $2"
        );
        sqlx::query_as::<_, Claim>(&query)
            .bind(CLAIM_STATUS_PENDING_PDF)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Active claims whose expiry date has passed.
    pub async fn list_expired(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<Vec<Claim>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM claims
             WHERE status = $1 AND expiry_date <= $2
             ORDER BY expiry_date ASC"
        );
        sqlx::query_as::<_, Claim>(&query)
            .bind(CLAIM_STATUS_ACTIVE)
            .bind(now)
            .fetch_all(pool)
            .await
    }

    /// Transition one claim `active -> expired`. Returns `None` when the
    /// claim was already expired (or otherwise left `active`), which makes
    /// the expire pass idempotent: a second run finds nothing to do.
    pub async fn expire(pool: &PgPool, id: DbId) -> Result<Option<Claim>, sqlx::Error> {
        let query = format!(
            "UPDATE claims
             SET status = $2, updated_at = now()
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Claim>(&query)
            .bind(id)
            .bind(CLAIM_STATUS_EXPIRED)
            .bind(CLAIM_STATUS_ACTIVE)
            .fetch_optional(pool)
            .await
    }

    /// Active claims expiring within the horizon that have not been warned
    /// yet. The `last_warned_at` watermark prevents a daily sweep from
    /// re-notifying the same claim.
    pub async fn list_expiring_unwarned(
        pool: &PgPool,
        now: Timestamp,
        horizon: Timestamp,
    ) -> Result<Vec<Claim>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM claims
             WHERE status = $1
               AND expiry_date > $2
               AND expiry_date <= $3
               AND last_warned_at IS NULL
             ORDER BY expiry_date ASC"
        );
        sqlx::query_as::<_, Claim>(&query)
            .bind(CLAIM_STATUS_ACTIVE)
            .bind(now)
            .bind(horizon)
            .fetch_all(pool)
            .await
    }

    /// Stamp the warned watermark. Returns `None` when another sweep run
    /// already stamped it.
    pub async fn mark_warned(
        pool: &PgPool,
        id: DbId,
        warned_at: Timestamp,
    ) -> Result<Option<Claim>, sqlx::Error> {
        let query = format!(
            "UPDATE claims
             SET last_warned_at = $2, updated_at = now()
             WHERE id = $1 AND last_warned_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Claim>(&query)
            .bind(id)
            .bind(warned_at)
            .fetch_optional(pool)
            .await
    }
}
