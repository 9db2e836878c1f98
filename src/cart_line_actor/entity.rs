//! Entity trait implementation for [`CartLine`].
//!
//! A line is unique per (cart, product) and never holds a quantity of zero:
//! creates and updates that would produce one are rejected, removal goes
//! through delete.

use crate::framework::ActorEntity;
use crate::model::{
    CartLine, CartLineCreate, CartLineFilter, CartLineId, CartLineUpdate, RecordError,
};
use async_trait::async_trait;
use chrono::Utc;
use std::convert::Infallible;

fn zero_quantity() -> RecordError {
    RecordError::Validation("cart line quantity must be at least 1".into())
}

#[async_trait]
impl ActorEntity for CartLine {
    const TABLE: &'static str = "cart_items";
    type Id = CartLineId;
    type Create = CartLineCreate;
    type Update = CartLineUpdate;
    type Action = Infallible;
    type ActionResult = ();
    type Filter = CartLineFilter;
    type Context = ();
    type Error = RecordError;

    fn from_create_params(id: CartLineId, params: CartLineCreate) -> Result<Self, RecordError> {
        if params.quantity == 0 {
            return Err(zero_quantity());
        }
        let now = Utc::now();
        Ok(Self {
            id,
            cart_id: params.cart_id,
            product_id: params.product_id,
            quantity: params.quantity,
            created_at: now,
            updated_at: now,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(CartLine::key(self.cart_id, self.product_id))
    }

    fn create_key(params: &CartLineCreate) -> Option<String> {
        Some(CartLine::key(params.cart_id, params.product_id))
    }

    fn matches(&self, filter: &CartLineFilter) -> bool {
        filter.cart_id.map_or(true, |id| self.cart_id == id)
            && filter.product_id.map_or(true, |id| self.product_id == id)
    }

    async fn on_update(&mut self, update: CartLineUpdate, _ctx: &()) -> Result<(), RecordError> {
        self.quantity = match update {
            CartLineUpdate::SetQuantity(0) | CartLineUpdate::Increment(0) => {
                return Err(zero_quantity())
            }
            CartLineUpdate::SetQuantity(quantity) => quantity,
            CartLineUpdate::Increment(by) => self.quantity.saturating_add(by),
        };
        self.updated_at = Utc::now();
        Ok(())
    }

    async fn handle_action(&mut self, action: Infallible, _ctx: &()) -> Result<(), RecordError> {
        match action {}
    }
}
