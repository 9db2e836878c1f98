//! Entity trait implementation for [`Cart`].
//!
//! The unique key is the owning identity, which gives the one-cart-per-user
//! invariant and lets [`CartClient::upsert_for`](crate::clients::CartClient::upsert_for)
//! fetch or create in a single request.

use crate::framework::ActorEntity;
use crate::model::{Cart, CartCreate, CartFilter, CartId, CartUpdate, RecordError};
use async_trait::async_trait;
use chrono::Utc;
use std::convert::Infallible;

#[async_trait]
impl ActorEntity for Cart {
    const TABLE: &'static str = "carts";
    type Id = CartId;
    type Create = CartCreate;
    type Update = CartUpdate;
    type Action = Infallible;
    type ActionResult = ();
    type Filter = CartFilter;
    type Context = ();
    type Error = RecordError;

    fn from_create_params(id: CartId, params: CartCreate) -> Result<Self, RecordError> {
        let now = Utc::now();
        Ok(Self {
            id,
            user_id: params.user_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.user_id.to_string())
    }

    fn create_key(params: &CartCreate) -> Option<String> {
        Some(params.user_id.to_string())
    }

    fn owner(&self) -> Option<String> {
        Some(self.user_id.to_string())
    }

    fn matches(&self, filter: &CartFilter) -> bool {
        filter
            .user_id
            .as_ref()
            .map_or(true, |user_id| &self.user_id == user_id)
    }

    async fn on_update(&mut self, update: CartUpdate, _ctx: &()) -> Result<(), RecordError> {
        match update {
            CartUpdate::Touch => self.updated_at = Utc::now(),
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: Infallible, _ctx: &()) -> Result<(), RecordError> {
        match action {}
    }
}
