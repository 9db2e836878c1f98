//! # Order Actor
//!
//! Placed orders. The actor's context is the [`OrderNumbering`] scheme, which
//! turns the allocated id into the human-facing order number.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](crate::framework::ActorEntity) implementation for [`Order`]
//! - [`new()`] - Factory function that creates the actor and client

pub mod entity;

use crate::clients::OrderClient;
use crate::framework::ResourceActor;
use crate::model::{Order, OrderId};

/// How order numbers are formed: `<prefix>-<id padded to 5 digits>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderNumbering {
    prefix: String,
}

impl OrderNumbering {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn format(&self, id: OrderId) -> String {
        format!("{}-{:05}", self.prefix, id.0)
    }
}

/// Creates a new Order actor and its client.
///
/// The returned actor must be run with an [`OrderNumbering`] context.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, OrderClient::new(generic_client))
}
