use crate::clients::StoreError;
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{
    Order, OrderAction, OrderCreate, OrderFilter, OrderId, OrderStatus, OrderUpdate, Rating, UserId,
};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// Inserts the order and its lines in one record create and returns the
    /// stored order, with its assigned number.
    #[instrument(skip(self, order), fields(lines = order.lines.len(), total = %order.totals.total))]
    pub async fn create_order(&self, order: OrderCreate) -> Result<Order, StoreError> {
        debug!(?order, "create_order called");
        let id = self.inner.create(order).await?;
        info!(order_id = %id, "Order stored");
        self.inner
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Writes the rating once. A second rating fails with
    /// [`RecordError::AlreadyRated`](crate::model::RecordError::AlreadyRated).
    #[instrument(skip(self, note))]
    pub async fn rate(
        &self,
        id: OrderId,
        rating: Rating,
        note: Option<String>,
    ) -> Result<Order, StoreError> {
        debug!("Sending request");
        Ok(self.inner.update(id, OrderUpdate::Rate { rating, note }).await?)
    }

    #[instrument(skip(self))]
    pub async fn advance(&self, id: OrderId, status: OrderStatus) -> Result<Order, StoreError> {
        debug!("Sending request");
        Ok(self
            .inner
            .perform_action(id, OrderAction::Advance(status))
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, StoreError> {
        debug!("Sending request");
        let filter = OrderFilter {
            user_id: Some(user_id.clone()),
        };
        Ok(self.inner.list(filter).await?)
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = StoreError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        StoreError::from(e)
    }
}
