use thiserror::Error;

/// Error vocabulary shared by the repository and service layers.
///
/// Each variant maps onto exactly one HTTP status at the API boundary,
/// so inner layers can wrap context without losing the kind.
#[derive(Debug, Error)]
pub enum TodoError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("todo not found")]
    NotFound,

    #[error("store error: {0}")]
    Store(String),

    #[error("operation timed out")]
    Timeout,
}
