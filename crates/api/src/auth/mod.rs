//! Authentication: JWT validation and claims.
//!
//! Account management and token issuance live in an external service; this
//! API only validates HS256 tokens signed with the shared secret.

pub mod jwt;
