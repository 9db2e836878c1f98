use crate::clients::StoreError;
use crate::framework::{ActorClient, ChangeEvent, FrameworkError, ResourceClient};
use crate::model::{MessageCreate, MessageFilter, MessageId, MessageUpdate, OrderMessage, UserId};
use async_trait::async_trait;
use std::cmp::Reverse;
use tokio::sync::broadcast;
use tracing::{debug, instrument};

/// Client for the order messages table.
#[derive(Clone)]
pub struct MessageClient {
    inner: ResourceClient<OrderMessage>,
}

impl MessageClient {
    pub fn new(inner: ResourceClient<OrderMessage>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, message), fields(order_id = %message.order_id, kind = ?message.message_type))]
    pub async fn post(&self, message: MessageCreate) -> Result<MessageId, StoreError> {
        debug!("Sending request");
        Ok(self.inner.create(message).await?)
    }

    /// The user's messages, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<OrderMessage>, StoreError> {
        debug!("Sending request");
        let mut messages = self
            .inner
            .list(MessageFilter::for_user(user_id.clone()))
            .await?;
        messages.sort_by_key(|m| Reverse((m.created_at, m.id)));
        Ok(messages)
    }

    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: MessageId) -> Result<OrderMessage, StoreError> {
        debug!("Sending request");
        Ok(self.inner.update(id, MessageUpdate::MarkRead).await?)
    }

    /// Marks every unread message of the user. Returns how many changed.
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, user_id: &UserId) -> Result<usize, StoreError> {
        debug!("Sending request");
        Ok(self
            .inner
            .update_where(MessageFilter::unread_for(user_id.clone()), MessageUpdate::MarkRead)
            .await?)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.inner.subscribe()
    }
}

#[async_trait]
impl ActorClient<OrderMessage> for MessageClient {
    type Error = StoreError;

    fn inner(&self) -> &ResourceClient<OrderMessage> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        StoreError::from(e)
    }
}
