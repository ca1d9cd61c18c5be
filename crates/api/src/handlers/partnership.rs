//! Handlers for the partnership registry.
//!
//! Partnerships are trust edges between domains. Either side may request
//! one; only the receiving (non-initiating) side may accept or decline.
//! Reactivating an inactive partnership re-enters `pending`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use scope3_core::error::CoreError;
use scope3_core::events::{
    EVENT_PARTNERSHIP_ACCEPTED, EVENT_PARTNERSHIP_DECLINED, EVENT_PARTNERSHIP_REQUESTED,
};
use scope3_core::partnership::{
    PARTNERSHIP_STATUS_ACTIVE, PARTNERSHIP_STATUS_INACTIVE, PARTNERSHIP_STATUS_PENDING,
};
use scope3_core::types::DbId;
use scope3_db::models::partnership::{Partnership, RequestPartnership, SetPartnershipStatus};
use scope3_db::repositories::{DomainRepo, PartnershipRepo};
use scope3_events::LedgerEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthDomain;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/partnerships
///
/// Request a partnership with another domain, or reactivate an inactive one
/// (the caller becomes the requester in that case).
pub async fn request_partnership(
    auth: AuthDomain,
    State(state): State<AppState>,
    Json(input): Json<RequestPartnership>,
) -> AppResult<impl IntoResponse> {
    if input.partner_domain_id == auth.domain_id {
        return Err(AppError::Core(CoreError::Validation(
            "cannot partner with your own domain".into(),
        )));
    }

    DomainRepo::find_by_id(&state.pool, input.partner_domain_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Domain",
                id: input.partner_domain_id.to_string(),
            })
        })?;

    let existing =
        PartnershipRepo::find_between(&state.pool, auth.domain_id, input.partner_domain_id)
            .await?;

    let partnership = match existing {
        Some(p) if p.status == PARTNERSHIP_STATUS_INACTIVE => {
            PartnershipRepo::reactivate(&state.pool, p.id, auth.domain_id, input.partner_domain_id)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::Conflict(
                        "partnership was modified concurrently".into(),
                    ))
                })?
        }
        Some(p) => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "a {} partnership already exists between these domains",
                p.status
            ))));
        }
        None => {
            PartnershipRepo::create(&state.pool, auth.domain_id, input.partner_domain_id).await?
        }
    };

    state.event_bus.publish(
        LedgerEvent::new(EVENT_PARTNERSHIP_REQUESTED)
            .for_domain(partnership.partner_domain_id)
            .with_actor(auth.user_id)
            .with_payload(partnership_payload(&partnership)),
    );

    tracing::info!(
        partnership_id = partnership.id,
        requester_domain_id = partnership.requester_domain_id,
        partner_domain_id = partnership.partner_domain_id,
        "Partnership requested"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: partnership })))
}

/// POST /api/v1/partnerships/{id}/status
///
/// Accept (`active`), decline, or deactivate (`inactive`) a partnership.
/// Only the receiving domain may do this; a requester cannot activate its
/// own outgoing request.
pub async fn set_partnership_status(
    auth: AuthDomain,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
    Json(input): Json<SetPartnershipStatus>,
) -> AppResult<impl IntoResponse> {
    let partnership = PartnershipRepo::find_by_id(&state.pool, partnership_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Partnership",
                id: partnership_id.to_string(),
            })
        })?;

    if partnership.partner_domain_id != auth.domain_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the receiving domain may change a partnership's status".into(),
        )));
    }

    let allowed = matches!(
        (partnership.status.as_str(), input.status.as_str()),
        (PARTNERSHIP_STATUS_PENDING, PARTNERSHIP_STATUS_ACTIVE)
            | (PARTNERSHIP_STATUS_PENDING, PARTNERSHIP_STATUS_INACTIVE)
            | (PARTNERSHIP_STATUS_ACTIVE, PARTNERSHIP_STATUS_INACTIVE)
    );
    if !allowed {
        return Err(AppError::Core(CoreError::InvalidStateTransition(format!(
            "cannot move partnership from {} to {}",
            partnership.status, input.status
        ))));
    }

    let updated = PartnershipRepo::set_status(
        &state.pool,
        partnership.id,
        &partnership.status,
        &input.status,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "partnership was modified concurrently".into(),
        ))
    })?;

    let event_type = if updated.status == PARTNERSHIP_STATUS_ACTIVE {
        EVENT_PARTNERSHIP_ACCEPTED
    } else {
        EVENT_PARTNERSHIP_DECLINED
    };
    state.event_bus.publish(
        LedgerEvent::new(event_type)
            .for_domain(updated.requester_domain_id)
            .with_actor(auth.user_id)
            .with_payload(partnership_payload(&updated)),
    );

    tracing::info!(
        partnership_id = updated.id,
        status = %updated.status,
        "Partnership status changed"
    );

    Ok(Json(DataResponse { data: updated }))
}

/// GET /api/v1/partnerships
///
/// List partnerships involving the caller's domain.
pub async fn list_partnerships(
    auth: AuthDomain,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let partnerships = PartnershipRepo::list_for_domain(&state.pool, auth.domain_id).await?;
    Ok(Json(DataResponse { data: partnerships }))
}

/// Query string for the partnership activity check.
#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    pub domain_id: DbId,
}

/// Response payload for the partnership activity check.
#[derive(Debug, Serialize)]
pub struct ActiveResponse {
    pub active: bool,
}

/// GET /api/v1/partnerships/active?domain_id={other}
///
/// Whether an active partnership exists between the caller's domain and
/// `domain_id`. This is the same gate transfer creation uses.
pub async fn is_partnership_active(
    auth: AuthDomain,
    State(state): State<AppState>,
    Query(query): Query<ActiveQuery>,
) -> AppResult<impl IntoResponse> {
    let active = PartnershipRepo::is_active(&state.pool, auth.domain_id, query.domain_id).await?;
    Ok(Json(DataResponse {
        data: ActiveResponse { active },
    }))
}

fn partnership_payload(partnership: &Partnership) -> serde_json::Value {
    serde_json::json!({
        "partnership_id": partnership.id,
        "requester_domain_id": partnership.requester_domain_id,
        "partner_domain_id": partnership.partner_domain_id,
        "status": partnership.status,
    })
}
