use crate::clients::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FeedError {
    /// The read flag could not be written.
    #[error(transparent)]
    Transaction(#[from] StoreError),
}
