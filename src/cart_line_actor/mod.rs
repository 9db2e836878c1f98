//! # Cart Line Actor
//!
//! Product and quantity rows belonging to a cart (`cart_items`).

pub mod entity;

use crate::clients::CartLineClient;
use crate::framework::ResourceActor;
use crate::model::CartLine;

/// Creates a new CartLine actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<CartLine>, CartLineClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, CartLineClient::new(generic_client))
}
