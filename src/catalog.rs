//! Read-only view of the product catalog.

use crate::clients::ProductClient;
use crate::model::Product;
use tracing::{debug, instrument, warn};

#[derive(Clone)]
pub struct ProductCatalog {
    products: ProductClient,
}

impl ProductCatalog {
    pub fn new(products: ProductClient) -> Self {
        Self { products }
    }

    /// Available products in catalog order. Empty when the read fails.
    #[instrument(skip(self))]
    pub async fn list_available(&self) -> Vec<Product> {
        match self.products.list_available().await {
            Ok(products) => {
                debug!(count = products.len(), "Catalog loaded");
                products
            }
            Err(e) => {
                warn!(error = %e, "Catalog read failed, showing empty catalog");
                Vec::new()
            }
        }
    }
}
