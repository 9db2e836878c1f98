//! Entity trait implementation for the Product domain type.
//!
//! Products have no custom actions. After seeding, only price and
//! availability change.

use crate::framework::ActorEntity;
use crate::model::{Product, ProductCreate, ProductFilter, ProductId, ProductUpdate, RecordError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::convert::Infallible;

#[async_trait]
impl ActorEntity for Product {
    const TABLE: &'static str = "products";
    type Id = ProductId;
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Action = Infallible;
    type ActionResult = ();
    type Filter = ProductFilter;
    type Context = ();
    type Error = RecordError;

    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, RecordError> {
        if params.name.trim().is_empty() {
            return Err(RecordError::Validation("product name is required".into()));
        }
        if params.price < Decimal::ZERO {
            return Err(RecordError::Validation("price must not be negative".into()));
        }
        Ok(Self {
            id,
            name: params.name,
            description: params.description,
            price: params.price,
            image_url: params.image_url,
            category: params.category,
            is_best_seller: params.is_best_seller,
            is_available: params.is_available,
            tags: params.tags,
            sort_order: params.sort_order,
        })
    }

    fn matches(&self, filter: &ProductFilter) -> bool {
        if filter.available_only && !self.is_available {
            return false;
        }
        match &filter.ids {
            Some(ids) => ids.contains(&self.id),
            None => true,
        }
    }

    /// # Fields Updated
    /// - `price`: must stay non-negative
    /// - `is_available`: catalog visibility
    async fn on_update(&mut self, update: ProductUpdate, _ctx: &()) -> Result<(), RecordError> {
        if let Some(price) = update.price {
            if price < Decimal::ZERO {
                return Err(RecordError::Validation("price must not be negative".into()));
            }
            self.price = price;
        }
        if let Some(available) = update.is_available {
            self.is_available = available;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: Infallible, _ctx: &()) -> Result<(), RecordError> {
        match action {}
    }
}
