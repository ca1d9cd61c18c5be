//! Shared test harness for HTTP-level integration tests.
//!
//! Builds the full application router (same middleware stack as `main.rs`)
//! on top of a `#[sqlx::test]`-provided pool, and provides request helpers
//! that attach JWT Bearer tokens the way real clients do.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use scope3_api::auth::jwt::{generate_access_token, JwtConfig};
use scope3_api::config::{LedgerConfig, ServerConfig};
use scope3_api::router::build_app_router;
use scope3_api::state::AppState;
use scope3_api::statements::LocalStatementRenderer;
use scope3_core::types::DbId;
use scope3_db::models::domain::CreateDomain;
use scope3_db::models::intervention::CreateIntervention;
use scope3_db::repositories::{DomainRepo, InterventionRepo};

/// Signing secret used by every test token.
const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
        ledger: LedgerConfig::default(),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool. Statements render into a throwaway directory so
/// claims come back `active` without an external renderer.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let statements_dir = tempfile::TempDir::new()
        .expect("failed to create statements dir")
        .keep();

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(scope3_events::EventBus::default()),
        statements: Arc::new(LocalStatementRenderer::new(statements_dir)),
    };

    build_app_router(state, &config)
}

/// Issue a member token for the given user and domain.
pub fn member_token(user_id: DbId, domain_id: DbId) -> String {
    generate_access_token(user_id, domain_id, "member", &test_config().jwt)
        .expect("failed to sign test token")
}

/// Issue an admin token for the given user and domain.
pub fn admin_token(user_id: DbId, domain_id: DbId) -> String {
    generate_access_token(user_id, domain_id, "admin", &test_config().jwt)
        .expect("failed to sign test token")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send an authenticated GET request.
pub async fn get(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send an unauthenticated GET request.
pub async fn get_unauth(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send an authenticated POST request with a JSON body.
pub async fn post_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send an authenticated POST request with an empty body.
pub async fn post_empty(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body was not valid JSON")
}

// ---------------------------------------------------------------------------
// Fixture helpers
// ---------------------------------------------------------------------------

/// Insert a domain row directly, returning its id.
pub async fn seed_domain(pool: &PgPool, name: &str) -> DbId {
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

/// Insert an intervention row directly, returning its id.
pub async fn seed_intervention(pool: &PgPool, domain_id: DbId, total: f64) -> DbId {
    InterventionRepo::create(
        pool,
        &CreateIntervention {
            domain_id,
            external_id: None,
            name: "Reforestation 2024".to_string(),
            total_amount: total,
            vintage: 2024,
        },
    )
    .await
    .unwrap()
    .id
}
