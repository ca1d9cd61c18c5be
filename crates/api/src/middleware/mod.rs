//! Axum extractors and middleware.

pub mod auth;
