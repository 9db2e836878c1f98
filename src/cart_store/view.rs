//! Read-side types of the cart: one flattened view per line plus the
//! snapshot observers receive.

use crate::model::{CartId, CartLineId, Product, ProductId, UserId};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Display;

/// How a cart line is addressed.
///
/// A line added optimistically has no row id until the follow-up reload, so it
/// is addressed by product until then.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LineRef {
    Pending(ProductId),
    Persisted(CartLineId),
}

impl Display for LineRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineRef::Pending(product_id) => write!(f, "temp-{}", product_id.0),
            LineRef::Persisted(id) => id.fmt(f),
        }
    }
}

/// A cart line joined with its product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItemView {
    pub line: LineRef,
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    /// Product image, or the configured placeholder.
    pub image_url: String,
    pub category: String,
    pub is_best_seller: bool,
    pub tags: Vec<String>,
    pub quantity: u32,
}

impl CartItemView {
    pub fn new(line: LineRef, product: &Product, quantity: u32, placeholder_image: &str) -> Self {
        Self {
            line,
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image_url: product
                .image_url
                .clone()
                .unwrap_or_else(|| placeholder_image.to_string()),
            category: product.category.clone(),
            is_best_seller: product.is_best_seller,
            tags: product.tags.clone(),
            quantity,
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Sum of quantities, saturating at `u32::MAX`.
pub(crate) fn count_lines(lines: &[CartItemView]) -> u32 {
    lines
        .iter()
        .fold(0, |count: u32, line| count.saturating_add(line.quantity))
}

/// What observers of a [`CartStore`](super::CartStore) see.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CartSnapshot {
    pub user_id: Option<UserId>,
    pub cart_id: Option<CartId>,
    pub lines: Vec<CartItemView>,
    pub loading: bool,
}

impl CartSnapshot {
    /// Sum of all line quantities.
    pub fn cart_count(&self) -> u32 {
        count_lines(&self.lines)
    }

    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartItemView::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
