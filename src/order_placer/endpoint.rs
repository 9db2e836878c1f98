//! The placement endpoint and its in-process implementation.

use crate::clients::{OrderClient, ProductClient, StoreError};
use crate::fulfillment::Fulfillment;
use crate::model::{OrderCreate, OrderId, OrderLine, ProductId, RecordError, UserId};
use crate::order_placer::{PlaceOrderPayload, ValidationError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{info, instrument, warn};

/// JSON body of a placement response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlacementBody {
    #[serde(rename_all = "camelCase")]
    Placed {
        success: bool,
        order_id: OrderId,
        order_number: String,
    },
    Failed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementResponse {
    pub status: u16,
    pub body: PlacementBody,
}

impl PlacementResponse {
    pub fn placed(order_id: OrderId, order_number: String) -> Self {
        Self {
            status: 200,
            body: PlacementBody::Placed {
                success: true,
                order_id,
                order_number,
            },
        }
    }

    pub fn failed(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            body: PlacementBody::Failed {
                error: Some(error.into()),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Where [`OrderPlacer`](super::OrderPlacer) sends a submission.
#[async_trait]
pub trait PlacementEndpoint: Send + Sync {
    async fn submit(&self, user: Option<&UserId>, payload: &PlaceOrderPayload)
        -> PlacementResponse;
}

/// The server side of placement, backed by the record actors.
///
/// Re-validates the payload, checks the products, computes the totals itself
/// and stores the order with its lines in a single create.
#[derive(Clone)]
pub struct StoreEndpoint {
    products: ProductClient,
    orders: OrderClient,
    fulfillment: Fulfillment,
    delivery_fee: Decimal,
}

impl StoreEndpoint {
    pub fn new(
        products: ProductClient,
        orders: OrderClient,
        fulfillment: Fulfillment,
        delivery_fee: Decimal,
    ) -> Self {
        Self {
            products,
            orders,
            fulfillment,
            delivery_fee,
        }
    }

    /// Every submitted product must exist and be available.
    async fn check_products(
        &self,
        payload: &PlaceOrderPayload,
    ) -> Result<Result<(), ValidationError>, StoreError> {
        let ids: BTreeSet<ProductId> = payload.cart_items.iter().map(|l| l.product_id).collect();
        let available: HashMap<ProductId, bool> = self
            .products
            .list_by_ids(ids.iter().copied().collect())
            .await?
            .into_iter()
            .map(|p| (p.id, p.is_available))
            .collect();
        Ok(match ids.into_iter().find(|id| available.get(id) != Some(&true)) {
            Some(id) => Err(ValidationError::UnavailableProduct(id)),
            None => Ok(()),
        })
    }

    fn order_create(
        &self,
        user: Option<&UserId>,
        payload: &PlaceOrderPayload,
    ) -> Result<OrderCreate, ValidationError> {
        let totals = payload.totals(self.delivery_fee)?;
        let lines: Vec<OrderLine> = payload
            .cart_items
            .iter()
            .map(|line| OrderLine {
                product_id: line.product_id,
                name: line.name.clone(),
                unit_price: line.price,
                quantity: line.quantity,
            })
            .collect();
        Ok(OrderCreate {
            user_id: user.cloned(),
            customer_name: payload.customer_name.trim().to_string(),
            customer_phone: payload.customer_phone.trim().to_string(),
            delivery_mode: payload.delivery_mode,
            delivery_address: payload.address().map(str::to_string),
            delivery_location: payload.location(),
            payment_method: payload.payment_method,
            scheduled_date: payload.scheduled_date,
            lines,
            totals,
        })
    }
}

#[async_trait]
impl PlacementEndpoint for StoreEndpoint {
    #[instrument(skip(self, payload), fields(user_id = ?user.map(UserId::as_str), lines = payload.cart_items.len()))]
    async fn submit(
        &self,
        user: Option<&UserId>,
        payload: &PlaceOrderPayload,
    ) -> PlacementResponse {
        if let Err(e) = payload.validate() {
            warn!(error = %e, "Placement rejected");
            return PlacementResponse::failed(400, e.to_string());
        }
        match self.check_products(payload).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "Placement rejected");
                return PlacementResponse::failed(400, e.to_string());
            }
            Err(e) => return PlacementResponse::failed(500, e.to_string()),
        }

        let create = match self.order_create(user, payload) {
            Ok(create) => create,
            Err(e) => {
                warn!(error = %e, "Placement rejected");
                return PlacementResponse::failed(400, e.to_string());
            }
        };
        let order = match self.orders.create_order(create).await {
            Ok(order) => order,
            Err(StoreError::Record(e @ RecordError::Validation(_))) => {
                return PlacementResponse::failed(400, e.to_string())
            }
            Err(e) => {
                warn!(error = %e, "Order write failed");
                return PlacementResponse::failed(500, e.to_string());
            }
        };
        info!(order_id = %order.id, order_number = %order.order_number, total = %order.total, "Order placed");

        if let Err(e) = self.fulfillment.send_receipt(&order).await {
            warn!(order_id = %order.id, error = %e, "Receipt not sent");
        }
        PlacementResponse::placed(order.id, order.order_number)
    }
}
