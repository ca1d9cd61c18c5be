//! Scope3 event bus and notification delivery infrastructure.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`LedgerEvent`] — the canonical domain event envelope.
//! - [`delivery`] — SMTP email delivery.
//!
//! The ledger core publishes events fire-and-forget; the notification
//! router (in the api crate) subscribes and turns events into notification
//! rows and emails, so request handlers never block on delivery.

pub mod bus;
pub mod delivery;

pub use bus::{EventBus, LedgerEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
