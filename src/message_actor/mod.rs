//! # Order Message Actor
//!
//! Notifications from the fulfillment side to customers (`order_messages`).
//! Change events carry the recipient as owner, so a feed can subscribe to its
//! own rows only.

pub mod entity;

use crate::clients::MessageClient;
use crate::framework::ResourceActor;
use crate::model::OrderMessage;

/// Creates a new OrderMessage actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<OrderMessage>, MessageClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, MessageClient::new(generic_client))
}
