//! # Product Actor
//!
//! The catalog table. Read by the storefront through
//! [`ProductClient`](crate::clients::ProductClient); written by seeding and
//! catalog maintenance.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](crate::framework::ActorEntity) implementation for [`Product`]
//! - [`new()`] - Factory function that creates the actor and client

pub mod entity;

use crate::clients::ProductClient;
use crate::framework::ResourceActor;
use crate::model::Product;

/// Creates a new Product actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Product>, ProductClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, ProductClient::new(generic_client))
}
