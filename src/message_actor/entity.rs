use crate::framework::ActorEntity;
use crate::model::{
    MessageCreate, MessageFilter, MessageId, MessageUpdate, OrderMessage, RecordError,
};
use async_trait::async_trait;
use chrono::Utc;
use std::convert::Infallible;

#[async_trait]
impl ActorEntity for OrderMessage {
    const TABLE: &'static str = "order_messages";
    type Id = MessageId;
    type Create = MessageCreate;
    type Update = MessageUpdate;
    type Action = Infallible;
    type ActionResult = ();
    type Filter = MessageFilter;
    type Context = ();
    type Error = RecordError;

    fn from_create_params(id: MessageId, params: MessageCreate) -> Result<Self, RecordError> {
        Ok(Self {
            id,
            order_id: params.order_id,
            user_id: params.user_id,
            sender: params.sender,
            message_type: params.message_type,
            body: params.body,
            read: false,
            created_at: Utc::now(),
        })
    }

    fn owner(&self) -> Option<String> {
        Some(self.user_id.to_string())
    }

    fn matches(&self, filter: &MessageFilter) -> bool {
        if filter.unread_only && self.read {
            return false;
        }
        filter
            .user_id
            .as_ref()
            .map_or(true, |user_id| &self.user_id == user_id)
    }

    // There is no update that clears `read`.
    async fn on_update(&mut self, update: MessageUpdate, _ctx: &()) -> Result<(), RecordError> {
        match update {
            MessageUpdate::MarkRead => self.read = true,
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: Infallible, _ctx: &()) -> Result<(), RecordError> {
        match action {}
    }
}
