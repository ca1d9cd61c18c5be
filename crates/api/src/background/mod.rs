//! Background tasks and scheduled jobs.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn`. All tasks accept a [`CancellationToken`]
//! for graceful shutdown and share no state with request handlers beyond
//! the database pool and the event bus.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod expiration;
pub mod statement_retry;
