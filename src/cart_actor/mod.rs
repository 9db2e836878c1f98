//! # Cart Actor
//!
//! One cart per identity, created lazily. Lines live in the separate
//! [`cart_line_actor`](crate::cart_line_actor) table.

pub mod entity;

use crate::clients::CartClient;
use crate::framework::ResourceActor;
use crate::model::Cart;

/// Creates a new Cart actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Cart>, CartClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, CartClient::new(generic_client))
}
