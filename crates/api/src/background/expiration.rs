//! Claim expiration sweeps.
//!
//! Two independently-scheduled passes over the `claims` table:
//!
//! - **Expire pass**: transitions claims past their expiry date from
//!   `active` to `expired` and notifies the claiming domain. Expiry never
//!   restores the intervention balance — expired claims stay consumed.
//! - **Warn pass**: notifies domains about claims expiring within the
//!   configured horizon. The `last_warned_at` watermark makes each claim
//!   warn at most once.
//!
//! Both passes are idempotent (compare-and-swap transitions) and keep
//! going when an individual claim fails to process.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use scope3_core::events::{EVENT_CLAIM_EXPIRED, EVENT_CLAIM_EXPIRING};
use scope3_db::models::claim::Claim;
use scope3_db::repositories::ClaimRepo;
use scope3_db::DbPool;
use scope3_events::{EventBus, LedgerEvent};
use tokio_util::sync::CancellationToken;

use crate::config::LedgerConfig;

/// Counters reported by a sweep pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Claims transitioned (expired) or stamped (warned) by this run.
    pub processed: usize,
    /// Claims that errored; they are retried on the next run.
    pub failed: usize,
}

/// Run the expire pass once: every active claim whose expiry date has
/// passed is moved to `expired` and its domain notified.
///
/// Safe to re-run: the `active -> expired` transition is keyed on the
/// current status, so a second run skips already-expired claims and emits
/// no duplicate notifications.
pub async fn run_expire_pass(pool: &DbPool, bus: &EventBus) -> Result<SweepSummary, sqlx::Error> {
    let now = Utc::now();
    let due = ClaimRepo::list_expired(pool, now).await?;
    let mut summary = SweepSummary::default();

    for claim in due {
        match ClaimRepo::expire(pool, claim.id).await {
            Ok(Some(expired)) => {
                bus.publish(
                    LedgerEvent::new(EVENT_CLAIM_EXPIRED)
                        .for_domain(expired.domain_id)
                        .with_payload(claim_payload(&expired)),
                );
                summary.processed += 1;
            }
            // Another run got there first; nothing to do.
            Ok(None) => {}
            Err(e) => {
                tracing::error!(claim_id = claim.id, error = %e, "Failed to expire claim");
                summary.failed += 1;
            }
        }
    }

    if summary.processed > 0 || summary.failed > 0 {
        tracing::info!(
            expired = summary.processed,
            failed = summary.failed,
            "Expire pass finished"
        );
    }
    Ok(summary)
}

/// Run the warn pass once: every active, not-yet-warned claim expiring
/// within `horizon_days` is stamped and its domain notified with the days
/// remaining.
pub async fn run_warn_pass(
    pool: &DbPool,
    bus: &EventBus,
    horizon_days: i64,
) -> Result<SweepSummary, sqlx::Error> {
    let now = Utc::now();
    let horizon = now + chrono::Duration::days(horizon_days);
    let expiring = ClaimRepo::list_expiring_unwarned(pool, now, horizon).await?;
    let mut summary = SweepSummary::default();

    for claim in expiring {
        match ClaimRepo::mark_warned(pool, claim.id, now).await {
            Ok(Some(warned)) => {
                let days_until_expiry = (warned.expiry_date - now).num_days();
                let mut payload = claim_payload(&warned);
                payload["days_until_expiry"] = serde_json::json!(days_until_expiry);
                bus.publish(
                    LedgerEvent::new(EVENT_CLAIM_EXPIRING)
                        .for_domain(warned.domain_id)
                        .with_payload(payload),
                );
                summary.processed += 1;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(claim_id = claim.id, error = %e, "Failed to warn claim");
                summary.failed += 1;
            }
        }
    }

    if summary.processed > 0 || summary.failed > 0 {
        tracing::info!(
            warned = summary.processed,
            failed = summary.failed,
            "Warn pass finished"
        );
    }
    Ok(summary)
}

/// Run the expire pass on a fixed interval until `cancel` is triggered.
pub async fn run_expire_loop(
    pool: DbPool,
    bus: Arc<EventBus>,
    config: LedgerConfig,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = config.expire_sweep_interval_secs,
        "Expiration sweep started"
    );
    let mut interval =
        tokio::time::interval(Duration::from_secs(config.expire_sweep_interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Expiration sweep stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = run_expire_pass(&pool, &bus).await {
                    tracing::error!(error = %e, "Expire pass failed");
                }
            }
        }
    }
}

/// Run the warn pass on a fixed interval until `cancel` is triggered.
pub async fn run_warn_loop(
    pool: DbPool,
    bus: Arc<EventBus>,
    config: LedgerConfig,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = config.warn_sweep_interval_secs,
        horizon_days = config.expiry_warning_days,
        "Expiry warning sweep started"
    );
    let mut interval = tokio::time::interval(Duration::from_secs(config.warn_sweep_interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Expiry warning sweep stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = run_warn_pass(&pool, &bus, config.expiry_warning_days).await {
                    tracing::error!(error = %e, "Warn pass failed");
                }
            }
        }
    }
}

fn claim_payload(claim: &Claim) -> serde_json::Value {
    serde_json::json!({
        "claim_id": claim.id,
        "intervention_id": claim.intervention_id,
        "amount": claim.amount,
        "vintage": claim.vintage,
        "expiry_date": claim.expiry_date,
    })
}
