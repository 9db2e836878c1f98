//! Type-safe record identifiers.
//!
//! Record ids are `u32` newtypes allocated by the owning actor. [`UserId`] is
//! different: it is the opaque identifier issued by the authentication
//! provider and is never allocated here.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Defines a `u32` record id with a display prefix.
macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a catalog product.
    ProductId,
    "product"
);
record_id!(
    /// Identifier of a user's cart.
    CartId,
    "cart"
);
record_id!(
    /// Identifier of a persisted cart line.
    CartLineId,
    "line"
);
record_id!(
    /// Identifier of a placed order. `OrderId(0)` is never allocated.
    OrderId,
    "order"
);
record_id!(MessageId, "message");

/// Identity issued by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
