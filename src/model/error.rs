//! Errors raised by record hooks.

use crate::model::{OrderId, OrderStatus};
use thiserror::Error;

/// Rejections from the record actors' hooks.
///
/// These travel inside [`FrameworkError::EntityError`](crate::framework::FrameworkError)
/// and are recovered by the table clients.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordError {
    /// The payload violates a record invariant.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The order already carries a rating.
    #[error("Order {0} has already been rated")]
    AlreadyRated(OrderId),

    /// The requested status change is not part of the lifecycle.
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}
