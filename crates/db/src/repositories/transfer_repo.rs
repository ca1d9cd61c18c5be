//! Repository for the `transfers` table: the transfer coordinator.
//!
//! Creation reserves the balance; approval is balance-neutral; rejection
//! restores the reservation. Status changes are compare-and-swap UPDATEs
//! keyed on `status = 'pending'`, so concurrent approve/reject calls on
//! the same transfer cannot both succeed.

use scope3_core::transfer::{
    TRANSFER_STATUS_CANCELLED, TRANSFER_STATUS_COMPLETED, TRANSFER_STATUS_PENDING,
};
use scope3_core::types::DbId;
use sqlx::PgPool;

use crate::models::transfer::{CreateTransfer, Transfer, TransferWithIntervention};
use crate::repositories::InterventionRepo;

/// Column list for transfers queries.
const COLUMNS: &str = "id, intervention_id, source_domain_id, target_domain_id, amount, \
    status, notes, created_by_id, completed_at, created_at, updated_at";

/// Outcome of an attempted transfer creation.
#[derive(Debug)]
pub enum TransferOutcome {
    /// The balance was reserved and the transfer row committed as `pending`.
    Created(Transfer),
    /// The intervention holds less than the requested amount.
    Insufficient { available: f64 },
    /// The intervention row disappeared between resolution and creation.
    InterventionMissing,
}

/// Provides lifecycle operations for transfers.
pub struct TransferRepo;

impl TransferRepo {
    /// Create a pending transfer: reserve the balance and insert the row in
    /// one transaction. Partnership and ownership checks happen at the API
    /// layer; the amount check happens here, inside the transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTransfer,
    ) -> Result<TransferOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let reserved =
            InterventionRepo::reserve(&mut *tx, input.intervention_id, input.amount).await?;
        if reserved.is_none() {
            let available =
                InterventionRepo::get_available(&mut *tx, input.intervention_id).await?;
            return Ok(match available {
                Some(available) => TransferOutcome::Insufficient { available },
                None => TransferOutcome::InterventionMissing,
            });
        }

        let query = format!(
            "INSERT INTO transfers
                (intervention_id, source_domain_id, target_domain_id, amount, status, notes, created_by_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let transfer = sqlx::query_as::<_, Transfer>(&query)
            .bind(input.intervention_id)
            .bind(input.source_domain_id)
            .bind(input.target_domain_id)
            .bind(input.amount)
            .bind(TRANSFER_STATUS_PENDING)
            .bind(&input.notes)
            .bind(input.created_by_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(TransferOutcome::Created(transfer))
    }

    /// Find a transfer by its id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Transfer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transfers WHERE id = $1");
        sqlx::query_as::<_, Transfer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Approve a pending transfer: `pending -> completed`, stamping
    /// `completed_at`. No balance change — the reservation was applied at
    /// creation. Returns `None` when the transfer is not pending.
    pub async fn complete(pool: &PgPool, id: DbId) -> Result<Option<Transfer>, sqlx::Error> {
        let query = format!(
            "UPDATE transfers
             SET status = $2, completed_at = now(), updated_at = now()
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transfer>(&query)
            .bind(id)
            .bind(TRANSFER_STATUS_COMPLETED)
            .bind(TRANSFER_STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// Reject a pending transfer: `pending -> cancelled` and restore the
    /// reserved amount onto the intervention, atomically. Returns `None`
    /// when the transfer is not pending (nothing is restored in that case).
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<Option<Transfer>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE transfers
             SET status = $2, updated_at = now()
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        let transfer = sqlx::query_as::<_, Transfer>(&query)
            .bind(id)
            .bind(TRANSFER_STATUS_CANCELLED)
            .bind(TRANSFER_STATUS_PENDING)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(transfer) = transfer else {
            return Ok(None);
        };

        let released =
            InterventionRepo::release(&mut *tx, transfer.intervention_id, transfer.amount)
                .await?;
        if released.is_none() {
            // Restoring would push remaining above total. This cannot
            // happen unless the ledger is already corrupt; refuse to make
            // it worse.
            return Err(sqlx::Error::Protocol(format!(
                "release of {} on intervention {} would exceed total_amount",
                transfer.amount, transfer.intervention_id
            )));
        }

        tx.commit().await?;
        Ok(Some(transfer))
    }

    /// List transfers where the domain is source or target, joined with
    /// intervention context, newest first.
    pub async fn list_for_domain(
        pool: &PgPool,
        domain_id: DbId,
    ) -> Result<Vec<TransferWithIntervention>, sqlx::Error> {
        sqlx::query_as::<_, TransferWithIntervention>(
            "SELECT
                t.id, t.intervention_id,
                i.name AS intervention_name,
                t.source_domain_id, t.target_domain_id, t.amount, t.status,
                t.notes, t.completed_at, t.created_at
             FROM transfers t
             JOIN interventions i ON i.id = t.intervention_id
             WHERE t.source_domain_id = $1 OR t.target_domain_id = $1
             ORDER BY t.created_at DESC",
        )
        .bind(domain_id)
        .fetch_all(pool)
        .await
    }
}
