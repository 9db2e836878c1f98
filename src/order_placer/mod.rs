//! # Order Placement
//!
//! Turns a cart snapshot into a stored order. The payload is validated before
//! it leaves the client and again by the endpoint; the endpoint is the only
//! party that computes totals and writes. Creation is all-or-nothing: a failed
//! placement leaves no order and no order lines behind.

pub mod endpoint;
pub mod error;
pub mod payload;

pub use endpoint::{PlacementBody, PlacementEndpoint, PlacementResponse, StoreEndpoint};
pub use error::PlaceOrderError;
pub use payload::{CheckoutSelections, PlaceOrderLine, PlaceOrderPayload, ValidationError};

use crate::model::{OrderId, UserId};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Message used when a failed response carries no `error`.
pub const DEFAULT_FAILURE: &str = "Failed to place order";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub order_number: String,
}

#[derive(Clone)]
pub struct OrderPlacer {
    endpoint: Arc<dyn PlacementEndpoint>,
}

impl OrderPlacer {
    pub fn new(endpoint: Arc<dyn PlacementEndpoint>) -> Self {
        Self { endpoint }
    }

    #[instrument(skip(self, payload), fields(mode = %payload.delivery_mode, lines = payload.cart_items.len()))]
    pub async fn place(
        &self,
        user: Option<&UserId>,
        payload: &PlaceOrderPayload,
    ) -> Result<PlacedOrder, PlaceOrderError> {
        payload.validate()?;

        let response = self.endpoint.submit(user, payload).await;
        match (response.is_success(), response.body) {
            (
                true,
                PlacementBody::Placed {
                    success: true,
                    order_id,
                    order_number,
                },
            ) => {
                info!(order_id = %order_id, order_number = %order_number, "Order placed");
                Ok(PlacedOrder {
                    order_id,
                    order_number,
                })
            }
            (_, PlacementBody::Failed { error: Some(error) }) => {
                warn!(status = response.status, error = %error, "Placement failed");
                Err(PlaceOrderError::Transaction(error))
            }
            _ => {
                warn!(status = response.status, "Placement failed");
                Err(PlaceOrderError::Transaction(DEFAULT_FAILURE.to_string()))
            }
        }
    }
}
