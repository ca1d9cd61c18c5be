//! Statement renderer implementations.
//!
//! The production deployment renders claim statements through an external
//! HTTP service ([`HttpStatementRenderer`]). When no service is configured,
//! [`LocalStatementRenderer`] writes a plain-text statement to a local
//! directory so development and tests run without the collaborator.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scope3_core::statement::{StatementError, StatementInput, StatementRenderer};

/// Upper bound on a single render call. The claim path must not block
/// indefinitely on the collaborator.
const RENDER_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// HTTP renderer
// ---------------------------------------------------------------------------

/// Renders statements via `POST {base_url}/render`. The service responds
/// with `{ "key": "<artifact reference>" }`.
pub struct HttpStatementRenderer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStatementRenderer {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(RENDER_TIMEOUT)
            .build()
            .expect("reqwest client construction cannot fail with static options");
        Self { client, base_url }
    }
}

#[derive(serde::Deserialize)]
struct RenderResponse {
    key: String,
}

#[async_trait]
impl StatementRenderer for HttpStatementRenderer {
    async fn render(&self, input: &StatementInput) -> Result<String, StatementError> {
        let url = format!("{}/render", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "claim_id": input.claim_id,
                "domain_name": input.domain_name,
                "intervention_name": input.intervention_name,
                "amount": input.amount,
                "vintage": input.vintage,
                "expiry_date": input.expiry_date,
            }))
            .send()
            .await
            .map_err(|e| StatementError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StatementError::Rejected(format!(
                "renderer returned {}",
                response.status()
            )));
        }

        let body: RenderResponse = response
            .json()
            .await
            .map_err(|e| StatementError::Rejected(e.to_string()))?;
        Ok(body.key)
    }
}

// ---------------------------------------------------------------------------
// Local fallback renderer
// ---------------------------------------------------------------------------

/// Writes a plain-text statement file under a local directory and returns
/// its path as the artifact key.
pub struct LocalStatementRenderer {
    dir: PathBuf,
}

impl LocalStatementRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl StatementRenderer for LocalStatementRenderer {
    async fn render(&self, input: &StatementInput) -> Result<String, StatementError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StatementError::Storage(e.to_string()))?;

        let path = self.dir.join(format!("claim-{}.txt", input.claim_id));
        let contents = format!(
            "Carbon abatement claim statement\n\
             Claim:        {}\n\
             Claimant:     {}\n\
             Intervention: {}\n\
             Amount:       {} tCO2e\n\
             Vintage:      {}\n\
             Valid until:  {}\n",
            input.claim_id,
            input.domain_name,
            input.intervention_name,
            input.amount,
            input.vintage,
            input.expiry_date,
        );
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| StatementError::Storage(e.to_string()))?;

        Ok(path.to_string_lossy().into_owned())
    }
}

/// Pick a renderer from the environment: `STATEMENT_SERVICE_URL` selects
/// the HTTP renderer, otherwise statements are written under
/// `STATEMENTS_DIR` (default `./statements`).
pub fn renderer_from_env() -> Arc<dyn StatementRenderer> {
    match std::env::var("STATEMENT_SERVICE_URL") {
        Ok(url) => Arc::new(HttpStatementRenderer::new(url)),
        Err(_) => {
            let dir = std::env::var("STATEMENTS_DIR").unwrap_or_else(|_| "./statements".into());
            Arc::new(LocalStatementRenderer::new(dir))
        }
    }
}
