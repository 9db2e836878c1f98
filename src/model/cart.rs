use crate::model::{CartId, CartLineId, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's cart. At most one per identity, created lazily on first access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a cart.
#[derive(Debug, Clone)]
pub struct CartCreate {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartUpdate {
    /// Bumps `updated_at`. Sent by the fetch-or-create upsert.
    Touch,
}

#[derive(Debug, Clone, Default)]
pub struct CartFilter {
    pub user_id: Option<UserId>,
}

/// One product and quantity within a cart.
///
/// A line exists only while its quantity is at least 1, and a cart holds at
/// most one line per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartLine {
    /// Unique key of the (cart, product) pair.
    pub fn key(cart_id: CartId, product_id: ProductId) -> String {
        format!("{}:{}", cart_id.0, product_id.0)
    }
}

/// Payload for inserting a cart line.
#[derive(Debug, Clone)]
pub struct CartLineCreate {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartLineUpdate {
    SetQuantity(u32),
    Increment(u32),
}

#[derive(Debug, Clone, Default)]
pub struct CartLineFilter {
    pub cart_id: Option<CartId>,
    pub product_id: Option<ProductId>,
}

impl CartLineFilter {
    pub fn cart(cart_id: CartId) -> Self {
        Self {
            cart_id: Some(cart_id),
            product_id: None,
        }
    }

    pub fn line(cart_id: CartId, product_id: ProductId) -> Self {
        Self {
            cart_id: Some(cart_id),
            product_id: Some(product_id),
        }
    }
}
