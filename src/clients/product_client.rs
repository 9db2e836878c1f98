use crate::clients::StoreError;
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{Product, ProductCreate, ProductFilter, ProductId, ProductUpdate};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the catalog table.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<ProductId, StoreError> {
        debug!("Sending request");
        Ok(self.inner.create(params).await?)
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, StoreError> {
        debug!("Sending request");
        Ok(self.inner.update(id, update).await?)
    }

    /// Available products in catalog order (`sort_order`, then id).
    #[instrument(skip(self))]
    pub async fn list_available(&self) -> Result<Vec<Product>, StoreError> {
        debug!("Sending request");
        let mut products = self.inner.list(ProductFilter::available()).await?;
        products.sort_by_key(|p| (p.sort_order, p.id));
        Ok(products)
    }

    /// The subset of `ids` that exist, available or not.
    #[instrument(skip(self))]
    pub async fn list_by_ids(&self, ids: Vec<ProductId>) -> Result<Vec<Product>, StoreError> {
        debug!("Sending request");
        Ok(self.inner.list(ProductFilter::ids(ids)).await?)
    }
}

#[async_trait]
impl ActorClient<Product> for ProductClient {
    type Error = StoreError;

    fn inner(&self) -> &ResourceClient<Product> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        StoreError::from(e)
    }
}
