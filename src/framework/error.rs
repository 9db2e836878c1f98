//! # Framework Errors
//!
//! Errors raised by the record-actor plumbing itself, as opposed to the
//! per-table errors raised by entity hooks (carried inside [`FrameworkError::EntityError`]).

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unique key already exists: {0}")]
    Conflict(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Wraps an entity hook error.
    pub fn entity<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self::EntityError(Box::new(error))
    }
}
