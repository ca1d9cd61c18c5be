//! Transfer status constants.
//!
//! State machine: `pending -> completed` (target approves) or
//! `pending -> cancelled` (target rejects). `pending` is the only
//! non-terminal state.

pub const TRANSFER_STATUS_PENDING: &str = "pending";
pub const TRANSFER_STATUS_COMPLETED: &str = "completed";
pub const TRANSFER_STATUS_CANCELLED: &str = "cancelled";
