use crate::clients::StoreError;
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{
    CartId, CartLine, CartLineCreate, CartLineFilter, CartLineId, CartLineUpdate, ProductId,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the cart lines table.
///
/// Removals are idempotent: deleting a line that is already gone succeeds.
#[derive(Clone)]
pub struct CartLineClient {
    inner: ResourceClient<CartLine>,
}

impl CartLineClient {
    pub fn new(inner: ResourceClient<CartLine>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn list_for_cart(&self, cart_id: CartId) -> Result<Vec<CartLine>, StoreError> {
        debug!("Sending request");
        Ok(self.inner.list(CartLineFilter::cart(cart_id)).await?)
    }

    /// Adds `by` to the cart's line for `product_id`, inserting it if absent.
    #[instrument(skip(self))]
    pub async fn increment_or_insert(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        by: u32,
    ) -> Result<CartLine, StoreError> {
        debug!("Sending request");
        let params = CartLineCreate {
            cart_id,
            product_id,
            quantity: by,
        };
        Ok(self
            .inner
            .upsert(params, CartLineUpdate::Increment(by))
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        id: CartLineId,
        quantity: u32,
    ) -> Result<CartLine, StoreError> {
        debug!("Sending request");
        Ok(self
            .inner
            .update(id, CartLineUpdate::SetQuantity(quantity))
            .await?)
    }

    /// Sets the quantity on the line addressed by cart and product. Returns
    /// how many rows changed (0 or 1).
    #[instrument(skip(self))]
    pub async fn set_quantity_for(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<usize, StoreError> {
        debug!("Sending request");
        Ok(self
            .inner
            .update_where(
                CartLineFilter::line(cart_id, product_id),
                CartLineUpdate::SetQuantity(quantity),
            )
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: CartLineId) -> Result<(), StoreError> {
        debug!("Sending request");
        match self.inner.delete(id).await {
            Ok(()) | Err(FrameworkError::NotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn remove_product(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<usize, StoreError> {
        debug!("Sending request");
        Ok(self
            .inner
            .delete_where(CartLineFilter::line(cart_id, product_id))
            .await?)
    }

    /// Deletes every line of the cart. The cart itself is kept.
    #[instrument(skip(self))]
    pub async fn clear(&self, cart_id: CartId) -> Result<usize, StoreError> {
        debug!("Sending request");
        Ok(self.inner.delete_where(CartLineFilter::cart(cart_id)).await?)
    }
}

#[async_trait]
impl ActorClient<CartLine> for CartLineClient {
    type Error = StoreError;

    fn inner(&self) -> &ResourceClient<CartLine> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        StoreError::from(e)
    }
}
