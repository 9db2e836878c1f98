use crate::order_placer::ValidationError;
use thiserror::Error;

/// Why a placement did not produce an order.
///
/// In both cases nothing was stored.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlaceOrderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The endpoint refused or failed the write. Carries its `error` text.
    #[error("{0}")]
    Transaction(String),
}
