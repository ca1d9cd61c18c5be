//! Partnership status constants.
//!
//! A partnership is a trust edge between two domains. Only an `active`
//! partnership permits transfers between the pair. Reactivating an
//! `inactive` partnership re-enters `pending`.

pub const PARTNERSHIP_STATUS_PENDING: &str = "pending";
pub const PARTNERSHIP_STATUS_ACTIVE: &str = "active";
pub const PARTNERSHIP_STATUS_INACTIVE: &str = "inactive";
