//! Integration tests for the background sweeps: claim expiration, expiry
//! warnings, and statement-render retries. The passes are invoked directly
//! (the interval loops just schedule them) against a real database.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sqlx::PgPool;

use scope3_api::background::expiration::{run_expire_pass, run_warn_pass};
use scope3_api::background::statement_retry::run_retry_pass;
use scope3_api::statements::LocalStatementRenderer;
use scope3_core::claim::CLAIM_STATUS_ACTIVE;
use scope3_core::events::{EVENT_CLAIM_EXPIRED, EVENT_CLAIM_EXPIRING};
use scope3_db::models::claim::CreateClaim;
use scope3_db::models::domain::CreateDomain;
use scope3_db::models::intervention::CreateIntervention;
use scope3_db::repositories::{ClaimOutcome, ClaimRepo, DomainRepo, InterventionRepo};
use scope3_events::EventBus;

async fn seed_claim(pool: &PgPool, expiry: chrono::DateTime<Utc>) -> (i64, i64) {
    let domain = DomainRepo::create(
        pool,
        &CreateDomain {
            name: "acme".to_string(),
            contact_email: None,
        },
    )
    .await
    .unwrap()
    .id;

    let intervention = InterventionRepo::create(
        pool,
        &CreateIntervention {
            domain_id: domain,
            external_id: None,
            name: "Reforestation 2024".to_string(),
            total_amount: 500.0,
            vintage: 2024,
        },
    )
    .await
    .unwrap()
    .id;

    let outcome = ClaimRepo::create(
        pool,
        &CreateClaim {
            intervention_id: intervention,
            domain_id: domain,
            amount: 200.0,
            vintage: 2024,
        },
        expiry,
    )
    .await
    .unwrap();
    let claim = assert_matches!(outcome, ClaimOutcome::Created(c) => c);

    (claim.id, intervention)
}

#[sqlx::test(migrations = "../db/migrations")]
async fn expire_pass_is_idempotent_and_notifies_once(pool: PgPool) {
    let (claim_id, intervention) = seed_claim(&pool, Utc::now() - Duration::days(1)).await;

    let bus = EventBus::default();
    let mut receiver = bus.subscribe();

    let summary = run_expire_pass(&pool, &bus).await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 0);

    let event = receiver.try_recv().unwrap();
    assert_eq!(event.event_type, EVENT_CLAIM_EXPIRED);
    assert_eq!(event.payload["claim_id"].as_i64().unwrap(), claim_id);

    // A second run finds nothing and emits nothing.
    let summary = run_expire_pass(&pool, &bus).await.unwrap();
    assert_eq!(summary.processed, 0);
    assert!(receiver.try_recv().is_err());

    // The balance stays consumed.
    let remaining = InterventionRepo::get_available(&pool, intervention)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(remaining, 300.0);

    let claim = ClaimRepo::find_by_id(&pool, claim_id).await.unwrap().unwrap();
    assert_eq!(claim.status, "expired");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn warn_pass_warns_each_claim_once(pool: PgPool) {
    let (claim_id, _) = seed_claim(&pool, Utc::now() + Duration::days(10)).await;

    let bus = EventBus::default();
    let mut receiver = bus.subscribe();

    let summary = run_warn_pass(&pool, &bus, 30).await.unwrap();
    assert_eq!(summary.processed, 1);

    let event = receiver.try_recv().unwrap();
    assert_eq!(event.event_type, EVENT_CLAIM_EXPIRING);
    assert_eq!(event.payload["claim_id"].as_i64().unwrap(), claim_id);
    let days = event.payload["days_until_expiry"].as_i64().unwrap();
    assert!((0..=10).contains(&days), "days_until_expiry was {days}");

    // The watermark is stamped; the next run skips the claim.
    let summary = run_warn_pass(&pool, &bus, 30).await.unwrap();
    assert_eq!(summary.processed, 0);
    assert!(receiver.try_recv().is_err());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn warn_pass_ignores_claims_outside_the_horizon(pool: PgPool) {
    seed_claim(&pool, Utc::now() + Duration::days(90)).await;

    let bus = EventBus::default();
    let summary = run_warn_pass(&pool, &bus, 30).await.unwrap();
    assert_eq!(summary.processed, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn retry_pass_recovers_statement_pending_claims(pool: PgPool) {
    let (claim_id, _) = seed_claim(&pool, Utc::now() + Duration::days(730)).await;
    ClaimRepo::mark_statement_pending(&pool, claim_id)
        .await
        .unwrap()
        .unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let renderer = LocalStatementRenderer::new(dir.path());

    let recovered = run_retry_pass(&pool, &renderer).await.unwrap();
    assert_eq!(recovered, 1);

    let claim = ClaimRepo::find_by_id(&pool, claim_id).await.unwrap().unwrap();
    assert_eq!(claim.status, CLAIM_STATUS_ACTIVE);
    assert!(claim.statement_key.is_some());

    // Nothing left in the queue.
    let recovered = run_retry_pass(&pool, &renderer).await.unwrap();
    assert_eq!(recovered, 0);
}
