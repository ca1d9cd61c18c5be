//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use scope3_core::error::CoreError;
use scope3_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Role name carried by administrator tokens.
pub const ROLE_ADMIN: &str = "admin";

/// Authenticated caller extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Every ledger operation is scoped to the caller's company domain, so the
/// extractor surfaces `domain_id` alongside the user id.
#[derive(Debug, Clone)]
pub struct AuthDomain {
    /// The calling user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The company domain the caller acts for.
    pub domain_id: DbId,
    /// The caller's role name (e.g. `"admin"`, `"member"`).
    pub role: String,
}

impl AuthDomain {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

impl FromRequestParts<AppState> for AuthDomain {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthDomain {
            user_id: claims.sub,
            domain_id: claims.domain_id,
            role: claims.role,
        })
    }
}
