//! Canonical event type names published on the ledger event bus.
//!
//! Dot-separated, `entity.action` form. The notification router maps these
//! to human-readable messages and target domains.

pub const EVENT_CLAIM_CREATED: &str = "claim.created";
pub const EVENT_CLAIM_EXPIRED: &str = "claim.expired";
pub const EVENT_CLAIM_EXPIRING: &str = "claim.expiring";

pub const EVENT_TRANSFER_REQUESTED: &str = "transfer.requested";
pub const EVENT_TRANSFER_APPROVED: &str = "transfer.approved";
pub const EVENT_TRANSFER_REJECTED: &str = "transfer.rejected";

pub const EVENT_PARTNERSHIP_REQUESTED: &str = "partnership.requested";
pub const EVENT_PARTNERSHIP_ACCEPTED: &str = "partnership.accepted";
pub const EVENT_PARTNERSHIP_DECLINED: &str = "partnership.declined";
