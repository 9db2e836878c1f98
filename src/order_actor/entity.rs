//! Entity trait implementation for [`Order`].
//!
//! Orders are inserted whole, with their lines, in a single create. After that
//! only two writes exist: the one-time rating ([`OrderUpdate::Rate`]) and the
//! fulfillment status transitions ([`OrderAction::Advance`]).

use super::OrderNumbering;
use crate::framework::ActorEntity;
use crate::model::{
    Order, OrderAction, OrderCreate, OrderFilter, OrderId, OrderStatus, OrderUpdate, RecordError,
};
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

#[async_trait]
impl ActorEntity for Order {
    const TABLE: &'static str = "orders";
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Action = OrderAction;
    type ActionResult = Order;
    type Filter = OrderFilter;
    type Context = OrderNumbering;
    type Error = RecordError;

    /// Creates a `Pending`, unrated order. The order number is assigned in
    /// [`on_create`](ActorEntity::on_create).
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, RecordError> {
        if params.lines.is_empty() {
            return Err(RecordError::Validation("order has no lines".into()));
        }
        let now = Utc::now();
        Ok(Self {
            id,
            order_number: String::new(),
            user_id: params.user_id,
            customer_name: params.customer_name,
            customer_phone: params.customer_phone,
            delivery_mode: params.delivery_mode,
            delivery_address: params.delivery_address,
            delivery_location: params.delivery_location,
            payment_method: params.payment_method,
            scheduled_date: params.scheduled_date,
            lines: params.lines,
            subtotal: params.totals.subtotal,
            delivery_fee: params.totals.delivery_fee,
            total: params.totals.total,
            status: OrderStatus::Pending,
            rated: false,
            rating: None,
            rating_note: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn owner(&self) -> Option<String> {
        self.user_id.as_ref().map(ToString::to_string)
    }

    fn matches(&self, filter: &OrderFilter) -> bool {
        match &filter.user_id {
            Some(user_id) => self.user_id.as_ref() == Some(user_id),
            None => true,
        }
    }

    async fn on_create(&mut self, numbering: &OrderNumbering) -> Result<(), RecordError> {
        self.order_number = numbering.format(self.id);
        debug!(order_id = %self.id, order_number = %self.order_number, "Numbered order");
        Ok(())
    }

    /// # Rating
    /// Only an unrated order accepts a rating. The note is trimmed and a blank
    /// note is stored as `None`.
    async fn on_update(&mut self, update: OrderUpdate, _ctx: &OrderNumbering) -> Result<(), RecordError> {
        match update {
            OrderUpdate::Rate { rating, note } => {
                if self.rated {
                    return Err(RecordError::AlreadyRated(self.id));
                }
                self.rated = true;
                self.rating = Some(rating.value());
                self.rating_note = note
                    .map(|note| note.trim().to_string())
                    .filter(|note| !note.is_empty());
            }
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        _ctx: &OrderNumbering,
    ) -> Result<Order, RecordError> {
        match action {
            OrderAction::Advance(next) => {
                if !self.status.can_advance_to(next, self.delivery_mode) {
                    return Err(RecordError::InvalidTransition {
                        from: self.status,
                        to: next,
                    });
                }
                self.status = next;
                self.updated_at = Utc::now();
                Ok(self.clone())
            }
        }
    }
}
