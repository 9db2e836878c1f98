use crate::clients::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    /// No signed-in identity, or its cart has not been resolved yet.
    #[error("Cart is not ready")]
    NotReady,

    /// The durable write failed. The optimistic change has been reverted.
    #[error("Cart update failed: {0}")]
    Transaction(#[from] StoreError),
}
