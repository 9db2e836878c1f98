use crate::clients::StoreError;
use crate::model::OrderId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RatingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("A rating for this order is already being submitted")]
    InFlight,

    #[error("Order {0} has already been rated")]
    AlreadyRated(OrderId),

    #[error(transparent)]
    Transaction(StoreError),
}
