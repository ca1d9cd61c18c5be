//! Handlers for claim allocation and listing.
//!
//! A claim reserves part of an intervention's remaining balance for the
//! caller's domain for a fixed validity window. The reservation and the
//! claim row commit in one transaction; the statement artifact is rendered
//! afterwards, and a rendering failure downgrades the claim to
//! `pending_pdf` for background retry rather than rolling anything back.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use scope3_core::error::CoreError;
use scope3_core::events::EVENT_CLAIM_CREATED;
use scope3_core::statement::StatementInput;
use scope3_db::models::claim::{Claim, CreateClaim, CreateClaimRequest};
use scope3_db::repositories::{ClaimOutcome, ClaimRepo, DomainRepo, InterventionRepo};
use scope3_events::LedgerEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthDomain;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/claims
///
/// Allocate a claim against an intervention, referenced by internal id or
/// external identifier.
pub async fn create_claim(
    auth: AuthDomain,
    State(state): State<AppState>,
    Json(input): Json<CreateClaimRequest>,
) -> AppResult<impl IntoResponse> {
    if input.amount <= 0.0 {
        return Err(AppError::Core(CoreError::Validation(
            "amount must be positive".into(),
        )));
    }

    let intervention = InterventionRepo::find_by_ref(&state.pool, &input.intervention_ref)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Intervention",
                id: input.intervention_ref.clone(),
            })
        })?;

    let expiry_date =
        Utc::now() + chrono::Duration::days(state.config.ledger.claim_validity_days);
    let create = CreateClaim {
        intervention_id: intervention.id,
        domain_id: auth.domain_id,
        amount: input.amount,
        vintage: intervention.vintage,
    };

    let claim = match ClaimRepo::create(&state.pool, &create, expiry_date).await? {
        ClaimOutcome::Created(claim) => claim,
        ClaimOutcome::Insufficient { available } => {
            return Err(AppError::Core(CoreError::InsufficientAmount {
                requested: input.amount,
                available,
            }));
        }
        ClaimOutcome::InterventionMissing => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Intervention",
                id: input.intervention_ref.clone(),
            }));
        }
    };

    state.event_bus.publish(
        LedgerEvent::new(EVENT_CLAIM_CREATED)
            .for_domain(auth.domain_id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "claim_id": claim.id,
                "intervention_id": intervention.id,
                "intervention_name": intervention.name,
                "amount": claim.amount,
                "vintage": claim.vintage,
                "expiry_date": claim.expiry_date,
            })),
    );

    let claim = render_statement(&state, &auth, claim, &intervention.name).await?;

    tracing::info!(
        claim_id = claim.id,
        domain_id = auth.domain_id,
        intervention_id = intervention.id,
        amount = claim.amount,
        status = %claim.status,
        "Claim created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: claim })))
}

/// GET /api/v1/claims
///
/// List the caller domain's claims, joined with intervention context,
/// newest first.
pub async fn list_claims(
    auth: AuthDomain,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let claims = ClaimRepo::list_for_domain(&state.pool, auth.domain_id).await?;
    Ok(Json(DataResponse { data: claims }))
}

/// Render the statement artifact for a freshly committed claim.
///
/// On success the artifact key is attached; on failure the claim is
/// downgraded to `pending_pdf` (the balance reservation stands either way)
/// and the statement-retry task picks it up later.
async fn render_statement(
    state: &AppState,
    auth: &AuthDomain,
    claim: Claim,
    intervention_name: &str,
) -> AppResult<Claim> {
    let domain_name = DomainRepo::find_by_id(&state.pool, auth.domain_id)
        .await?
        .map(|d| d.name)
        .unwrap_or_else(|| format!("domain-{}", auth.domain_id));

    let input = StatementInput {
        claim_id: claim.id,
        domain_name,
        intervention_name: intervention_name.to_string(),
        amount: claim.amount,
        vintage: claim.vintage,
        expiry_date: claim.expiry_date,
    };

    match state.statements.render(&input).await {
        Ok(key) => {
            let updated = ClaimRepo::attach_statement(&state.pool, claim.id, &key).await?;
            Ok(updated.unwrap_or(claim))
        }
        Err(e) => {
            tracing::warn!(
                claim_id = claim.id,
                error = %e,
                "Statement rendering failed; claim downgraded to pending_pdf"
            );
            let updated = ClaimRepo::mark_statement_pending(&state.pool, claim.id).await?;
            Ok(updated.unwrap_or(claim))
        }
    }
}
