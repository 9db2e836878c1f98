use crate::model::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a catalog product.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](crate::framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](crate::framework::ResourceActor).
/// The catalog is read-only from the storefront's point of view; products are
/// only created by seeding and by tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category: String,
    pub is_best_seller: bool,
    pub is_available: bool,
    pub tags: Vec<String>,
    /// Catalog display order, ascending.
    pub sort_order: i32,
}

/// Payload for adding a product to the catalog.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category: String,
    pub is_best_seller: bool,
    pub is_available: bool,
    pub tags: Vec<String>,
    pub sort_order: i32,
}

impl ProductCreate {
    /// An available, untagged product in `category`.
    pub fn new(name: impl Into<String>, price: Decimal, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            image_url: None,
            category: category.into(),
            is_best_seller: false,
            is_available: true,
            tags: Vec::new(),
            sort_order: 0,
        }
    }

    pub fn sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn best_seller(mut self) -> Self {
        self.is_best_seller = true;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// DTOs for Product updates.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub price: Option<Decimal>,
    pub is_available: Option<bool>,
}

/// Query over the catalog.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub available_only: bool,
    pub ids: Option<Vec<ProductId>>,
}

impl ProductFilter {
    pub fn available() -> Self {
        Self {
            available_only: true,
            ids: None,
        }
    }

    pub fn ids(ids: Vec<ProductId>) -> Self {
        Self {
            available_only: false,
            ids: Some(ids),
        }
    }
}
