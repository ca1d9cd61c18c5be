//! Handlers for the transfer lifecycle.
//!
//! `pending -> completed` on target approval, `pending -> cancelled` on
//! target rejection. The balance decrement happens at creation; approval is
//! balance-neutral and rejection restores the reservation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use scope3_core::error::CoreError;
use scope3_core::events::{
    EVENT_TRANSFER_APPROVED, EVENT_TRANSFER_REJECTED, EVENT_TRANSFER_REQUESTED,
};
use scope3_core::transfer::TRANSFER_STATUS_PENDING;
use scope3_core::types::DbId;
use scope3_db::models::transfer::{CreateTransfer, CreateTransferRequest, Transfer};
use scope3_db::repositories::{
    DomainRepo, InterventionRepo, PartnershipRepo, TransferOutcome, TransferRepo,
};
use scope3_events::LedgerEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthDomain;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/transfers
///
/// Move part of an intervention's remaining balance to a partnered domain.
/// The intervention must belong to the caller's domain and an active
/// partnership must exist between the two domains.
pub async fn create_transfer(
    auth: AuthDomain,
    State(state): State<AppState>,
    Json(input): Json<CreateTransferRequest>,
) -> AppResult<impl IntoResponse> {
    if input.amount <= 0.0 {
        return Err(AppError::Core(CoreError::Validation(
            "amount must be positive".into(),
        )));
    }
    if input.target_domain_id == auth.domain_id {
        return Err(AppError::Core(CoreError::Validation(
            "cannot transfer to your own domain".into(),
        )));
    }

    let intervention = InterventionRepo::find_by_ref(&state.pool, &input.intervention_ref)
        .await?
        // An intervention owned by another domain is reported as missing
        // rather than forbidden, so callers cannot probe foreign ledgers.
        .filter(|i| i.domain_id == auth.domain_id)
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Intervention",
                id: input.intervention_ref.clone(),
            })
        })?;

    DomainRepo::find_by_id(&state.pool, input.target_domain_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Domain",
                id: input.target_domain_id.to_string(),
            })
        })?;

    if !PartnershipRepo::is_active(&state.pool, auth.domain_id, input.target_domain_id).await? {
        return Err(AppError::Core(CoreError::NoActivePartnership));
    }

    let create = CreateTransfer {
        intervention_id: intervention.id,
        source_domain_id: auth.domain_id,
        target_domain_id: input.target_domain_id,
        amount: input.amount,
        notes: input.notes,
        created_by_id: Some(auth.user_id),
    };

    let transfer = match TransferRepo::create(&state.pool, &create).await? {
        TransferOutcome::Created(transfer) => transfer,
        TransferOutcome::Insufficient { available } => {
            return Err(AppError::Core(CoreError::InsufficientAmount {
                requested: input.amount,
                available,
            }));
        }
        TransferOutcome::InterventionMissing => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Intervention",
                id: input.intervention_ref.clone(),
            }));
        }
    };

    state.event_bus.publish(
        LedgerEvent::new(EVENT_TRANSFER_REQUESTED)
            .for_domain(transfer.target_domain_id)
            .with_actor(auth.user_id)
            .with_payload(transfer_payload(&transfer, &intervention.name)),
    );

    tracing::info!(
        transfer_id = transfer.id,
        source_domain_id = transfer.source_domain_id,
        target_domain_id = transfer.target_domain_id,
        amount = transfer.amount,
        "Transfer requested"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: transfer })))
}

/// POST /api/v1/transfers/{id}/approve
///
/// Target-domain approval: `pending -> completed`. Balance-neutral.
pub async fn approve_transfer(
    auth: AuthDomain,
    State(state): State<AppState>,
    Path(transfer_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let transfer = load_for_decision(&state, transfer_id, &auth).await?;

    let completed = TransferRepo::complete(&state.pool, transfer.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::InvalidStateTransition(format!(
                "transfer {} is not pending",
                transfer.id
            )))
        })?;

    let intervention_name = intervention_name(&state, completed.intervention_id).await?;
    state.event_bus.publish(
        LedgerEvent::new(EVENT_TRANSFER_APPROVED)
            .for_domain(completed.source_domain_id)
            .for_domain(completed.target_domain_id)
            .with_actor(auth.user_id)
            .with_payload(transfer_payload(&completed, &intervention_name)),
    );

    tracing::info!(transfer_id = completed.id, "Transfer approved");

    Ok(Json(DataResponse { data: completed }))
}

/// POST /api/v1/transfers/{id}/reject
///
/// Target-domain rejection: `pending -> cancelled`, restoring the reserved
/// amount onto the intervention.
pub async fn reject_transfer(
    auth: AuthDomain,
    State(state): State<AppState>,
    Path(transfer_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let transfer = load_for_decision(&state, transfer_id, &auth).await?;

    let cancelled = TransferRepo::cancel(&state.pool, transfer.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::InvalidStateTransition(format!(
                "transfer {} is not pending",
                transfer.id
            )))
        })?;

    let intervention_name = intervention_name(&state, cancelled.intervention_id).await?;
    state.event_bus.publish(
        LedgerEvent::new(EVENT_TRANSFER_REJECTED)
            .for_domain(cancelled.source_domain_id)
            .with_actor(auth.user_id)
            .with_payload(transfer_payload(&cancelled, &intervention_name)),
    );

    tracing::info!(transfer_id = cancelled.id, "Transfer rejected, balance restored");

    Ok(Json(DataResponse { data: cancelled }))
}

/// GET /api/v1/transfers
///
/// List transfers where the caller's domain is source or target.
pub async fn list_transfers(
    auth: AuthDomain,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let transfers = TransferRepo::list_for_domain(&state.pool, auth.domain_id).await?;
    Ok(Json(DataResponse { data: transfers }))
}

/// Load a transfer and verify the caller is the target domain and the
/// transfer is still pending. The definitive pending check is the
/// compare-and-swap in the repository; this pre-check only produces better
/// error messages.
async fn load_for_decision(
    state: &AppState,
    transfer_id: DbId,
    auth: &AuthDomain,
) -> AppResult<Transfer> {
    let transfer = TransferRepo::find_by_id(&state.pool, transfer_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Transfer",
                id: transfer_id.to_string(),
            })
        })?;

    if transfer.target_domain_id != auth.domain_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the target domain may decide on a transfer".into(),
        )));
    }
    if transfer.status != TRANSFER_STATUS_PENDING {
        return Err(AppError::Core(CoreError::InvalidStateTransition(format!(
            "transfer {} is {}, expected pending",
            transfer.id, transfer.status
        ))));
    }
    Ok(transfer)
}

async fn intervention_name(state: &AppState, intervention_id: DbId) -> AppResult<String> {
    Ok(InterventionRepo::find_by_id(&state.pool, intervention_id)
        .await?
        .map(|i| i.name)
        .unwrap_or_else(|| format!("intervention-{intervention_id}")))
}

fn transfer_payload(transfer: &Transfer, intervention_name: &str) -> serde_json::Value {
    serde_json::json!({
        "transfer_id": transfer.id,
        "intervention_id": transfer.intervention_id,
        "intervention_name": intervention_name,
        "source_domain_id": transfer.source_domain_id,
        "target_domain_id": transfer.target_domain_id,
        "amount": transfer.amount,
        "status": transfer.status,
    })
}
