//! Statement renderer collaborator seam.
//!
//! Claim creation produces an off-ledger statement artifact (a PDF in the
//! production deployment). Rendering is an external service; this trait is
//! the only coupling the ledger core has to it. Renderer failure must never
//! corrupt claim or balance state — the claim is downgraded to
//! `pending_pdf` and retried in the background.

use async_trait::async_trait;

/// Inputs the renderer needs to produce a claim statement.
#[derive(Debug, Clone)]
pub struct StatementInput {
    pub claim_id: crate::types::DbId,
    pub domain_name: String,
    pub intervention_name: String,
    pub amount: f64,
    pub vintage: i32,
    pub expiry_date: crate::types::Timestamp,
}

#[derive(Debug, thiserror::Error)]
pub enum StatementError {
    #[error("Renderer unavailable: {0}")]
    Unavailable(String),

    #[error("Renderer rejected the request: {0}")]
    Rejected(String),

    #[error("Failed to store artifact: {0}")]
    Storage(String),
}

/// Renders a claim statement and returns a reference (key/path) to the
/// stored artifact.
#[async_trait]
pub trait StatementRenderer: Send + Sync {
    async fn render(&self, input: &StatementInput) -> Result<String, StatementError>;
}
