//! Handlers for intervention submission and lookup.
//!
//! Interventions enter the ledger as verified submissions (admin-gated);
//! bulk CSV ingestion lives in a separate service and is out of scope here.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use scope3_core::error::CoreError;
use scope3_core::types::DbId;
use scope3_db::models::intervention::CreateIntervention;
use scope3_db::repositories::{DomainRepo, InterventionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthDomain;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/interventions
///
/// Register a verified intervention. Admin only; `remaining_amount` starts
/// equal to `total_amount`.
pub async fn create_intervention(
    auth: AuthDomain,
    State(state): State<AppState>,
    Json(input): Json<CreateIntervention>,
) -> AppResult<impl IntoResponse> {
    if !auth.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only administrators may register interventions".into(),
        )));
    }
    if input.total_amount <= 0.0 {
        return Err(AppError::Core(CoreError::Validation(
            "total_amount must be positive".into(),
        )));
    }

    DomainRepo::find_by_id(&state.pool, input.domain_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Domain",
                id: input.domain_id.to_string(),
            })
        })?;

    let intervention = InterventionRepo::create(&state.pool, &input).await?;

    tracing::info!(
        intervention_id = intervention.id,
        domain_id = intervention.domain_id,
        total_amount = intervention.total_amount,
        vintage = intervention.vintage,
        "Intervention registered"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: intervention })))
}

/// GET /api/v1/interventions/{id}
pub async fn get_intervention(
    _auth: AuthDomain,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let intervention = InterventionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Intervention",
                id: id.to_string(),
            })
        })?;
    Ok(Json(DataResponse { data: intervention }))
}

/// GET /api/v1/interventions
///
/// List the interventions owned by the caller's domain, newest first.
pub async fn list_interventions(
    auth: AuthDomain,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let interventions = InterventionRepo::list_for_domain(&state.pool, auth.domain_id).await?;
    Ok(Json(DataResponse {
        data: interventions,
    }))
}
