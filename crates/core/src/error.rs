/// Domain-level error taxonomy for the ledger core.
///
/// Validation failures (`NotFound`, `InsufficientAmount`, `Forbidden`,
/// `InvalidStateTransition`, `NoActivePartnership`) are expected outcomes
/// and are returned as typed results, never panics.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// `id` is a display form: an internal id or an external reference.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// The requested amount exceeds what is still available on the
    /// intervention. Carries the actual available figure so callers can
    /// retry with a smaller amount.
    #[error("Insufficient amount: requested {requested}, available {available}")]
    InsufficientAmount { requested: f64, available: f64 },

    #[error("No active partnership exists between the two domains")]
    NoActivePartnership,

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An external collaborator (statement renderer, mailer) failed.
    #[error("Dependency failure: {0}")]
    Dependency(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
