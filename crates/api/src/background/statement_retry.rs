//! Background retry for failed statement rendering.
//!
//! Claims land in `pending_pdf` when the statement renderer fails during
//! claim creation. The claim and its balance reservation are already
//! committed; this task periodically re-renders the artifact and restores
//! the claim to `active`.

use std::sync::Arc;
use std::time::Duration;

use scope3_core::statement::{StatementInput, StatementRenderer};
use scope3_db::models::claim::Claim;
use scope3_db::repositories::{ClaimRepo, DomainRepo, InterventionRepo};
use scope3_db::DbPool;
use tokio_util::sync::CancellationToken;

/// Claims retried per run; the rest wait for the next tick.
const RETRY_BATCH_SIZE: i64 = 20;

/// Retry rendering for every `pending_pdf` claim in the batch. One claim's
/// failure does not stop the rest.
pub async fn run_retry_pass(
    pool: &DbPool,
    renderer: &dyn StatementRenderer,
) -> Result<usize, sqlx::Error> {
    let pending = ClaimRepo::list_statement_pending(pool, RETRY_BATCH_SIZE).await?;
    let mut recovered = 0;

    for claim in pending {
        match retry_claim(pool, renderer, &claim).await {
            Ok(()) => recovered += 1,
            Err(e) => {
                tracing::warn!(claim_id = claim.id, error = %e, "Statement retry failed");
            }
        }
    }

    if recovered > 0 {
        tracing::info!(recovered, "Statement retry pass recovered claims");
    }
    Ok(recovered)
}

async fn retry_claim(
    pool: &DbPool,
    renderer: &dyn StatementRenderer,
    claim: &Claim,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let intervention_name = InterventionRepo::find_by_id(pool, claim.intervention_id)
        .await?
        .map(|i| i.name)
        .unwrap_or_else(|| format!("intervention-{}", claim.intervention_id));
    let domain_name = DomainRepo::find_by_id(pool, claim.domain_id)
        .await?
        .map(|d| d.name)
        .unwrap_or_else(|| format!("domain-{}", claim.domain_id));

    let key = renderer
        .render(&StatementInput {
            claim_id: claim.id,
            domain_name,
            intervention_name,
            amount: claim.amount,
            vintage: claim.vintage,
            expiry_date: claim.expiry_date,
        })
        .await?;

    ClaimRepo::attach_statement(pool, claim.id, &key).await?;
    Ok(())
}

/// Run the retry pass on a fixed interval until `cancel` is triggered.
pub async fn run(
    pool: DbPool,
    renderer: Arc<dyn StatementRenderer>,
    interval_secs: u64,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs, "Statement retry task started");
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Statement retry task stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = run_retry_pass(&pool, renderer.as_ref()).await {
                    tracing::error!(error = %e, "Statement retry pass failed");
                }
            }
        }
    }
}
