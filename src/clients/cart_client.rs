use crate::clients::StoreError;
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{Cart, CartCreate, CartUpdate, UserId};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the carts table.
#[derive(Clone)]
pub struct CartClient {
    inner: ResourceClient<Cart>,
}

impl CartClient {
    pub fn new(inner: ResourceClient<Cart>) -> Self {
        Self { inner }
    }

    /// Fetches the user's cart, creating it on first access.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn upsert_for(&self, user_id: &UserId) -> Result<Cart, StoreError> {
        debug!("Sending request");
        let params = CartCreate {
            user_id: user_id.clone(),
        };
        Ok(self.inner.upsert(params, CartUpdate::Touch).await?)
    }
}

#[async_trait]
impl ActorClient<Cart> for CartClient {
    type Error = StoreError;

    fn inner(&self) -> &ResourceClient<Cart> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        StoreError::from(e)
    }
}
