//! Stand-in for the fulfillment side: the writes the storefront itself never
//! performs (status transitions and system messages).

use crate::clients::{MessageClient, OrderClient, StoreError};
use crate::framework::ActorClient;
use crate::model::{MessageCreate, MessageId, MessageType, Order, OrderId, OrderStatus};
use std::fmt::Write;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FulfillmentError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct Fulfillment {
    orders: OrderClient,
    messages: MessageClient,
}

impl Fulfillment {
    pub fn new(orders: OrderClient, messages: MessageClient) -> Self {
        Self { orders, messages }
    }

    /// Posts the receipt for a freshly placed order. Guest orders get none.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn send_receipt(&self, order: &Order) -> Result<Option<MessageId>, FulfillmentError> {
        self.post(order, MessageType::Receipt, receipt_body(order)).await
    }

    /// Moves the order to `status` and tells the customer. Reaching
    /// `Delivered` posts the rating prompt.
    #[instrument(skip(self))]
    pub async fn advance(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, FulfillmentError> {
        let order = self.orders.advance(order_id, status).await?;
        info!(order_number = %order.order_number, status = %order.status, "Order advanced");
        let (kind, body) = match status {
            OrderStatus::Delivered => (
                MessageType::RatingPrompt,
                format!(
                    "Order #{} was marked delivered. How was your experience?",
                    order.order_number
                ),
            ),
            other => (
                MessageType::General,
                format!("Order #{} is now {}.", order.order_number, other),
            ),
        };
        self.post(&order, kind, body).await?;
        Ok(order)
    }

    /// Posts a general notice about the order.
    #[instrument(skip(self, body))]
    pub async fn notify(
        &self,
        order_id: OrderId,
        body: impl Into<String> + Send,
    ) -> Result<Option<MessageId>, FulfillmentError> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;
        self.post(&order, MessageType::General, body.into()).await
    }

    async fn post(
        &self,
        order: &Order,
        kind: MessageType,
        body: String,
    ) -> Result<Option<MessageId>, FulfillmentError> {
        let Some(user_id) = order.user_id.clone() else {
            return Ok(None);
        };
        let id = self
            .messages
            .post(MessageCreate::system(order.id, user_id, kind, body))
            .await?;
        Ok(Some(id))
    }
}

fn receipt_body(order: &Order) -> String {
    let mut body = format!("Thank you for your order! Order #{}\n", order.order_number);
    for line in &order.lines {
        let _ = writeln!(body, "{} x {}: {}", line.quantity, line.name, line.line_total());
    }
    let _ = writeln!(body, "Subtotal: {}", order.subtotal);
    if order.delivery_fee > rust_decimal::Decimal::ZERO {
        let _ = writeln!(body, "Delivery fee: {}", order.delivery_fee);
    }
    let _ = writeln!(body, "Total: {}", order.total);
    let _ = write!(body, "{} via {}", order.delivery_mode, order.payment_method);
    body
}
