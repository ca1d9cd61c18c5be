//! Integration tests for the ledger repositories against a real database:
//! - Balance reservation and release semantics
//! - Claim allocation under concurrency
//! - Transfer lifecycle (approve is balance-neutral, reject restores)
//! - Partnership pair uniqueness and reactivation
//! - Expiration sweep queries and idempotence

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sqlx::PgPool;

use scope3_core::claim::{CLAIM_STATUS_ACTIVE, CLAIM_STATUS_EXPIRED};
use scope3_core::partnership::{
    PARTNERSHIP_STATUS_ACTIVE, PARTNERSHIP_STATUS_INACTIVE, PARTNERSHIP_STATUS_PENDING,
};
use scope3_core::transfer::{TRANSFER_STATUS_CANCELLED, TRANSFER_STATUS_COMPLETED};
use scope3_db::models::claim::CreateClaim;
use scope3_db::models::domain::CreateDomain;
use scope3_db::models::intervention::CreateIntervention;
use scope3_db::models::transfer::CreateTransfer;
use scope3_db::repositories::{
    ClaimOutcome, ClaimRepo, DomainRepo, InterventionRepo, PartnershipRepo, TransferOutcome,
    TransferRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_domain(pool: &PgPool, name: &str) -> i64 {
    DomainRepo::create(
        pool,
        &CreateDomain {
            name: name.to_string(),
            contact_email: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn new_intervention(pool: &PgPool, domain_id: i64, total: f64) -> i64 {
    InterventionRepo::create(
        pool,
        &CreateIntervention {
            domain_id,
            external_id: None,
            name: format!("Reforestation {total}"),
            total_amount: total,
            vintage: 2024,
        },
    )
    .await
    .unwrap()
    .id
}

fn new_claim(intervention_id: i64, domain_id: i64, amount: f64) -> CreateClaim {
    CreateClaim {
        intervention_id,
        domain_id,
        amount,
        vintage: 2024,
    }
}

fn new_transfer(intervention_id: i64, source: i64, target: i64, amount: f64) -> CreateTransfer {
    CreateTransfer {
        intervention_id,
        source_domain_id: source,
        target_domain_id: target,
        amount,
        notes: None,
        created_by_id: None,
    }
}

async fn remaining(pool: &PgPool, intervention_id: i64) -> f64 {
    InterventionRepo::get_available(pool, intervention_id)
        .await
        .unwrap()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Balance store
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn intervention_starts_with_full_balance(pool: PgPool) {
    let domain = new_domain(&pool, "acme").await;
    let intervention = new_intervention(&pool, domain, 500.0).await;

    assert_eq!(remaining(&pool, intervention).await, 500.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn reserve_fails_when_balance_insufficient(pool: PgPool) {
    let domain = new_domain(&pool, "acme").await;
    let intervention = new_intervention(&pool, domain, 100.0).await;

    assert_eq!(
        InterventionRepo::reserve(&pool, intervention, 60.0)
            .await
            .unwrap(),
        Some(40.0)
    );
    // 60 already reserved; a second 60 must not go through.
    assert_eq!(
        InterventionRepo::reserve(&pool, intervention, 60.0)
            .await
            .unwrap(),
        None
    );
    assert_eq!(remaining(&pool, intervention).await, 40.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn release_never_exceeds_total(pool: PgPool) {
    let domain = new_domain(&pool, "acme").await;
    let intervention = new_intervention(&pool, domain, 100.0).await;

    InterventionRepo::reserve(&pool, intervention, 30.0)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        InterventionRepo::release(&pool, intervention, 30.0)
            .await
            .unwrap(),
        Some(100.0)
    );
    // Balance is already back at total; releasing again must refuse.
    assert_eq!(
        InterventionRepo::release(&pool, intervention, 30.0)
            .await
            .unwrap(),
        None
    );
    assert_eq!(remaining(&pool, intervention).await, 100.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn reserve_on_missing_intervention_returns_none(pool: PgPool) {
    assert_eq!(
        InterventionRepo::reserve(&pool, 999_999, 1.0).await.unwrap(),
        None
    );
}

// ---------------------------------------------------------------------------
// Claim allocation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn claim_creation_decrements_balance(pool: PgPool) {
    let domain = new_domain(&pool, "acme").await;
    let intervention = new_intervention(&pool, domain, 500.0).await;

    let outcome = ClaimRepo::create(
        &pool,
        &new_claim(intervention, domain, 200.0),
        Utc::now() + Duration::days(730),
    )
    .await
    .unwrap();

    let claim = assert_matches!(outcome, ClaimOutcome::Created(c) => c);
    assert_eq!(claim.status, CLAIM_STATUS_ACTIVE);
    assert_eq!(claim.amount, 200.0);
    assert_eq!(remaining(&pool, intervention).await, 300.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn insufficient_claim_reports_available_and_writes_nothing(pool: PgPool) {
    let domain = new_domain(&pool, "acme").await;
    let intervention = new_intervention(&pool, domain, 500.0).await;

    ClaimRepo::create(
        &pool,
        &new_claim(intervention, domain, 200.0),
        Utc::now() + Duration::days(730),
    )
    .await
    .unwrap();

    let outcome = ClaimRepo::create(
        &pool,
        &new_claim(intervention, domain, 350.0),
        Utc::now() + Duration::days(730),
    )
    .await
    .unwrap();

    assert_matches!(outcome, ClaimOutcome::Insufficient { available } if available == 300.0);
    assert_eq!(remaining(&pool, intervention).await, 300.0);
    // Only the first claim row exists.
    assert_eq!(ClaimRepo::list_for_domain(&pool, domain).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn claim_on_missing_intervention_reports_missing(pool: PgPool) {
    let domain = new_domain(&pool, "acme").await;

    let outcome = ClaimRepo::create(
        &pool,
        &new_claim(999_999, domain, 10.0),
        Utc::now() + Duration::days(730),
    )
    .await
    .unwrap();

    assert_matches!(outcome, ClaimOutcome::InterventionMissing);
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_claims_cannot_overdraw(pool: PgPool) {
    let domain = new_domain(&pool, "acme").await;
    let intervention = new_intervention(&pool, domain, 100.0).await;
    let expiry = Utc::now() + Duration::days(730);

    // Two 60-unit claims race against a 100-unit balance; exactly one
    // may win.
    let claim_a = new_claim(intervention, domain, 60.0);
    let claim_b = new_claim(intervention, domain, 60.0);
    let (a, b) = tokio::join!(
        ClaimRepo::create(&pool, &claim_a, expiry),
        ClaimRepo::create(&pool, &claim_b, expiry),
    );

    let outcomes = [a.unwrap(), b.unwrap()];
    let created = outcomes
        .iter()
        .filter(|o| matches!(o, ClaimOutcome::Created(_)))
        .count();
    let insufficient = outcomes
        .iter()
        .filter(|o| matches!(o, ClaimOutcome::Insufficient { .. }))
        .count();

    assert_eq!(created, 1);
    assert_eq!(insufficient, 1);
    assert_eq!(remaining(&pool, intervention).await, 40.0);
}

// ---------------------------------------------------------------------------
// Transfer lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn transfer_creation_reserves_and_approval_is_balance_neutral(pool: PgPool) {
    let source = new_domain(&pool, "acme").await;
    let target = new_domain(&pool, "globex").await;
    let intervention = new_intervention(&pool, source, 500.0).await;

    let outcome = TransferRepo::create(&pool, &new_transfer(intervention, source, target, 100.0))
        .await
        .unwrap();
    let transfer = assert_matches!(outcome, TransferOutcome::Created(t) => t);
    assert_eq!(remaining(&pool, intervention).await, 400.0);

    let completed = TransferRepo::complete(&pool, transfer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(completed.status, TRANSFER_STATUS_COMPLETED);
    assert!(completed.completed_at.is_some());
    // Approval leaves the balance exactly where the reservation put it.
    assert_eq!(remaining(&pool, intervention).await, 400.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn transfer_rejection_restores_reserved_amount(pool: PgPool) {
    let source = new_domain(&pool, "acme").await;
    let target = new_domain(&pool, "globex").await;
    let intervention = new_intervention(&pool, source, 500.0).await;

    let outcome = TransferRepo::create(&pool, &new_transfer(intervention, source, target, 100.0))
        .await
        .unwrap();
    let transfer = assert_matches!(outcome, TransferOutcome::Created(t) => t);
    assert_eq!(remaining(&pool, intervention).await, 400.0);

    let cancelled = TransferRepo::cancel(&pool, transfer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cancelled.status, TRANSFER_STATUS_CANCELLED);
    assert_eq!(remaining(&pool, intervention).await, 500.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn decided_transfer_cannot_be_decided_again(pool: PgPool) {
    let source = new_domain(&pool, "acme").await;
    let target = new_domain(&pool, "globex").await;
    let intervention = new_intervention(&pool, source, 500.0).await;

    let outcome = TransferRepo::create(&pool, &new_transfer(intervention, source, target, 100.0))
        .await
        .unwrap();
    let transfer = assert_matches!(outcome, TransferOutcome::Created(t) => t);

    assert!(TransferRepo::complete(&pool, transfer.id)
        .await
        .unwrap()
        .is_some());
    // Approve again: no-op. Reject after approve: no-op, no balance change.
    assert!(TransferRepo::complete(&pool, transfer.id)
        .await
        .unwrap()
        .is_none());
    assert!(TransferRepo::cancel(&pool, transfer.id)
        .await
        .unwrap()
        .is_none());
    assert_eq!(remaining(&pool, intervention).await, 400.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn claims_and_transfers_draw_from_the_same_balance(pool: PgPool) {
    let source = new_domain(&pool, "acme").await;
    let target = new_domain(&pool, "globex").await;
    let intervention = new_intervention(&pool, source, 500.0).await;
    let expiry = Utc::now() + Duration::days(730);

    // Claim 200 -> remaining 300.
    let outcome = ClaimRepo::create(&pool, &new_claim(intervention, source, 200.0), expiry)
        .await
        .unwrap();
    assert_matches!(outcome, ClaimOutcome::Created(_));
    assert_eq!(remaining(&pool, intervention).await, 300.0);

    // Claim 350 -> refused, available 300.
    let outcome = ClaimRepo::create(&pool, &new_claim(intervention, source, 350.0), expiry)
        .await
        .unwrap();
    assert_matches!(outcome, ClaimOutcome::Insufficient { available } if available == 300.0);

    // Transfer 100 -> remaining 200.
    let outcome = TransferRepo::create(&pool, &new_transfer(intervention, source, target, 100.0))
        .await
        .unwrap();
    let transfer = assert_matches!(outcome, TransferOutcome::Created(t) => t);
    assert_eq!(remaining(&pool, intervention).await, 200.0);

    // Reject the transfer -> remaining 300.
    TransferRepo::cancel(&pool, transfer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(remaining(&pool, intervention).await, 300.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn consumed_balance_equals_active_claims_plus_pending_transfers(pool: PgPool) {
    let source = new_domain(&pool, "acme").await;
    let target = new_domain(&pool, "globex").await;
    let intervention = new_intervention(&pool, source, 500.0).await;
    let expiry = Utc::now() + Duration::days(730);

    ClaimRepo::create(&pool, &new_claim(intervention, source, 120.0), expiry)
        .await
        .unwrap();
    ClaimRepo::create(&pool, &new_claim(intervention, source, 80.0), expiry)
        .await
        .unwrap();
    TransferRepo::create(&pool, &new_transfer(intervention, source, target, 50.0))
        .await
        .unwrap();

    let (claimed,): (Option<f64>,) = sqlx::query_as(
        "SELECT SUM(amount) FROM claims WHERE intervention_id = $1 AND status = 'active'",
    )
    .bind(intervention)
    .fetch_one(&pool)
    .await
    .unwrap();
    let (in_transfer,): (Option<f64>,) = sqlx::query_as(
        "SELECT SUM(amount) FROM transfers WHERE intervention_id = $1 AND status = 'pending'",
    )
    .bind(intervention)
    .fetch_one(&pool)
    .await
    .unwrap();

    let consumed = 500.0 - remaining(&pool, intervention).await;
    assert_eq!(
        consumed,
        claimed.unwrap_or_default() + in_transfer.unwrap_or_default()
    );
}

// ---------------------------------------------------------------------------
// Partnerships
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn partnership_pair_is_unique_regardless_of_direction(pool: PgPool) {
    let a = new_domain(&pool, "acme").await;
    let b = new_domain(&pool, "globex").await;

    PartnershipRepo::create(&pool, a, b).await.unwrap();

    // Same pair from the other side violates the pair uniqueness index.
    let err = PartnershipRepo::create(&pool, b, a).await.unwrap_err();
    let db_err = err.as_database_error().expect("expected database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
}

#[sqlx::test(migrations = "./migrations")]
async fn partnership_lookup_works_in_both_directions(pool: PgPool) {
    let a = new_domain(&pool, "acme").await;
    let b = new_domain(&pool, "globex").await;

    let p = PartnershipRepo::create(&pool, a, b).await.unwrap();
    assert_eq!(p.status, PARTNERSHIP_STATUS_PENDING);

    assert!(PartnershipRepo::find_between(&pool, a, b).await.unwrap().is_some());
    assert!(PartnershipRepo::find_between(&pool, b, a).await.unwrap().is_some());

    // Pending does not gate transfers; only active does.
    assert!(!PartnershipRepo::is_active(&pool, a, b).await.unwrap());

    PartnershipRepo::set_status(&pool, p.id, PARTNERSHIP_STATUS_PENDING, PARTNERSHIP_STATUS_ACTIVE)
        .await
        .unwrap()
        .unwrap();
    assert!(PartnershipRepo::is_active(&pool, a, b).await.unwrap());
    assert!(PartnershipRepo::is_active(&pool, b, a).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn inactive_partnership_reactivates_as_pending(pool: PgPool) {
    let a = new_domain(&pool, "acme").await;
    let b = new_domain(&pool, "globex").await;

    let p = PartnershipRepo::create(&pool, a, b).await.unwrap();
    PartnershipRepo::set_status(&pool, p.id, PARTNERSHIP_STATUS_PENDING, PARTNERSHIP_STATUS_ACTIVE)
        .await
        .unwrap()
        .unwrap();
    PartnershipRepo::set_status(&pool, p.id, PARTNERSHIP_STATUS_ACTIVE, PARTNERSHIP_STATUS_INACTIVE)
        .await
        .unwrap()
        .unwrap();

    // Reactivation flips the direction: b now requests from a.
    let reopened = PartnershipRepo::reactivate(&pool, p.id, b, a)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reopened.status, PARTNERSHIP_STATUS_PENDING);
    assert_eq!(reopened.requester_domain_id, b);
    assert_eq!(reopened.partner_domain_id, a);

    // Not inactive anymore; a second reactivation finds nothing.
    assert!(PartnershipRepo::reactivate(&pool, p.id, a, b)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn set_status_is_keyed_on_expected_status(pool: PgPool) {
    let a = new_domain(&pool, "acme").await;
    let b = new_domain(&pool, "globex").await;

    let p = PartnershipRepo::create(&pool, a, b).await.unwrap();
    PartnershipRepo::set_status(&pool, p.id, PARTNERSHIP_STATUS_PENDING, PARTNERSHIP_STATUS_ACTIVE)
        .await
        .unwrap()
        .unwrap();

    // The request was already accepted; declining from pending must fail.
    assert!(PartnershipRepo::set_status(
        &pool,
        p.id,
        PARTNERSHIP_STATUS_PENDING,
        PARTNERSHIP_STATUS_INACTIVE
    )
    .await
    .unwrap()
    .is_none());
}

// ---------------------------------------------------------------------------
// Expiration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn expire_transitions_once_and_keeps_balance_consumed(pool: PgPool) {
    let domain = new_domain(&pool, "acme").await;
    let intervention = new_intervention(&pool, domain, 500.0).await;

    // Already past its expiry date.
    let outcome = ClaimRepo::create(
        &pool,
        &new_claim(intervention, domain, 200.0),
        Utc::now() - Duration::days(1),
    )
    .await
    .unwrap();
    let claim = assert_matches!(outcome, ClaimOutcome::Created(c) => c);

    let due = ClaimRepo::list_expired(&pool, Utc::now()).await.unwrap();
    assert_eq!(due.len(), 1);

    let expired = ClaimRepo::expire(&pool, claim.id).await.unwrap().unwrap();
    assert_eq!(expired.status, CLAIM_STATUS_EXPIRED);

    // Second run: nothing due, second expire is a no-op.
    assert!(ClaimRepo::list_expired(&pool, Utc::now()).await.unwrap().is_empty());
    assert!(ClaimRepo::expire(&pool, claim.id).await.unwrap().is_none());

    // Expiry never restores the balance.
    assert_eq!(remaining(&pool, intervention).await, 300.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn warn_watermark_prevents_repeat_warnings(pool: PgPool) {
    let domain = new_domain(&pool, "acme").await;
    let intervention = new_intervention(&pool, domain, 500.0).await;
    let now = Utc::now();

    // Expires in 10 days: inside a 30-day horizon.
    let outcome = ClaimRepo::create(
        &pool,
        &new_claim(intervention, domain, 50.0),
        now + Duration::days(10),
    )
    .await
    .unwrap();
    let claim = assert_matches!(outcome, ClaimOutcome::Created(c) => c);

    let horizon = now + Duration::days(30);
    let expiring = ClaimRepo::list_expiring_unwarned(&pool, now, horizon)
        .await
        .unwrap();
    assert_eq!(expiring.len(), 1);

    assert!(ClaimRepo::mark_warned(&pool, claim.id, now)
        .await
        .unwrap()
        .is_some());

    // Stamped: the next sweep skips it.
    assert!(ClaimRepo::list_expiring_unwarned(&pool, now, horizon)
        .await
        .unwrap()
        .is_empty());
    assert!(ClaimRepo::mark_warned(&pool, claim.id, now)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn claims_outside_warning_horizon_are_not_listed(pool: PgPool) {
    let domain = new_domain(&pool, "acme").await;
    let intervention = new_intervention(&pool, domain, 500.0).await;
    let now = Utc::now();

    ClaimRepo::create(
        &pool,
        &new_claim(intervention, domain, 50.0),
        now + Duration::days(90),
    )
    .await
    .unwrap();

    let expiring = ClaimRepo::list_expiring_unwarned(&pool, now, now + Duration::days(30))
        .await
        .unwrap();
    assert!(expiring.is_empty());
}

// ---------------------------------------------------------------------------
// Statement lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn statement_pending_claims_are_queued_and_recovered(pool: PgPool) {
    let domain = new_domain(&pool, "acme").await;
    let intervention = new_intervention(&pool, domain, 500.0).await;

    let outcome = ClaimRepo::create(
        &pool,
        &new_claim(intervention, domain, 50.0),
        Utc::now() + Duration::days(730),
    )
    .await
    .unwrap();
    let claim = assert_matches!(outcome, ClaimOutcome::Created(c) => c);

    let pending = ClaimRepo::mark_statement_pending(&pool, claim.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pending.status, "pending_pdf");
    assert_eq!(
        ClaimRepo::list_statement_pending(&pool, 10).await.unwrap().len(),
        1
    );

    let restored = ClaimRepo::attach_statement(&pool, claim.id, "statements/claim-1.pdf")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restored.status, CLAIM_STATUS_ACTIVE);
    assert_eq!(restored.statement_key.as_deref(), Some("statements/claim-1.pdf"));
    assert!(ClaimRepo::list_statement_pending(&pool, 10)
        .await
        .unwrap()
        .is_empty());

    // Attaching is keyed on a missing artifact; a second attach is a no-op.
    assert!(ClaimRepo::attach_statement(&pool, claim.id, "statements/other.pdf")
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Intervention resolution
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn find_by_ref_resolves_ids_and_external_ids(pool: PgPool) {
    let domain = new_domain(&pool, "acme").await;
    let created = InterventionRepo::create(
        &pool,
        &CreateIntervention {
            domain_id: domain,
            external_id: Some("VCS-1234".to_string()),
            name: "Cookstoves".to_string(),
            total_amount: 250.0,
            vintage: 2023,
        },
    )
    .await
    .unwrap();

    let by_id = InterventionRepo::find_by_ref(&pool, &created.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_id.id, created.id);

    let by_external = InterventionRepo::find_by_ref(&pool, "VCS-1234")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_external.id, created.id);

    assert!(InterventionRepo::find_by_ref(&pool, "VCS-9999")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_external_id_is_rejected(pool: PgPool) {
    let domain = new_domain(&pool, "acme").await;
    let input = CreateIntervention {
        domain_id: domain,
        external_id: Some("VCS-1234".to_string()),
        name: "Cookstoves".to_string(),
        total_amount: 250.0,
        vintage: 2023,
    };

    InterventionRepo::create(&pool, &input).await.unwrap();
    let err = InterventionRepo::create(&pool, &input).await.unwrap_err();
    let db_err = err.as_database_error().expect("expected database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
}
