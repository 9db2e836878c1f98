//! Errors surfaced by the table clients.

use crate::framework::FrameworkError;
use crate::model::RecordError;
use thiserror::Error;

/// A durable-store failure as seen by the storefront components.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique key (cart per user, line per product) is already taken.
    #[error("Duplicate record: {0}")]
    Conflict(String),

    /// A record hook rejected the write.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The actor could not be reached or did not answer.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<FrameworkError> for StoreError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => StoreError::NotFound(id),
            FrameworkError::Conflict(key) => StoreError::Conflict(key),
            FrameworkError::EntityError(inner) => match inner.downcast::<RecordError>() {
                Ok(record) => StoreError::Record(*record),
                Err(other) => StoreError::Unavailable(other.to_string()),
            },
            e @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                StoreError::Unavailable(e.to_string())
            }
        }
    }
}

impl From<String> for StoreError {
    fn from(msg: String) -> Self {
        StoreError::Unavailable(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderId;

    #[test]
    fn test_record_errors_survive_the_framework_box() {
        let framework = FrameworkError::entity(RecordError::AlreadyRated(OrderId(3)));
        assert_eq!(
            StoreError::from(framework),
            StoreError::Record(RecordError::AlreadyRated(OrderId(3)))
        );
        assert!(matches!(
            StoreError::from(FrameworkError::ActorClosed),
            StoreError::Unavailable(_)
        ));
    }
}
