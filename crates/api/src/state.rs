use std::sync::Arc;

use scope3_core::statement::StatementRenderer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: scope3_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing ledger events.
    pub event_bus: Arc<scope3_events::EventBus>,
    /// Statement renderer collaborator (external service or local fallback).
    pub statements: Arc<dyn StatementRenderer>,
}
