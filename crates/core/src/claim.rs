//! Claim status constants and validity rules.

/// Claim is live and counts against the intervention balance.
pub const CLAIM_STATUS_ACTIVE: &str = "active";

/// Claim passed its expiry date. The consumed balance is NOT restored.
pub const CLAIM_STATUS_EXPIRED: &str = "expired";

/// Claim is committed but its statement artifact has not been rendered yet.
/// A background task retries rendering and restores the claim to `active`.
pub const CLAIM_STATUS_PENDING_PDF: &str = "pending_pdf";

/// Default claim validity period in days (2 years).
pub const DEFAULT_CLAIM_VALIDITY_DAYS: i64 = 730;

/// Default warning horizon before expiry, in days.
pub const DEFAULT_EXPIRY_WARNING_DAYS: i64 = 30;
