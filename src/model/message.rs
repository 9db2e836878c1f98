use crate::model::{MessageId, OrderId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notification tied to one order and one recipient.
///
/// `read` is monotonic: it goes from `false` to `true` and never back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderMessage {
    pub id: MessageId,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub sender: MessageSender,
    pub message_type: MessageType,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSender {
    #[serde(rename = "admin")]
    System,
    #[serde(rename = "user")]
    Customer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Receipt,
    RatingPrompt,
    General,
}

/// Payload for posting a message.
#[derive(Debug, Clone)]
pub struct MessageCreate {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub sender: MessageSender,
    pub message_type: MessageType,
    pub body: String,
}

impl MessageCreate {
    /// A message from the storefront to the order's customer.
    pub fn system(
        order_id: OrderId,
        user_id: UserId,
        message_type: MessageType,
        body: impl Into<String>,
    ) -> Self {
        Self {
            order_id,
            user_id,
            sender: MessageSender::System,
            message_type,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageUpdate {
    MarkRead,
}

#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub user_id: Option<UserId>,
    pub unread_only: bool,
}

impl MessageFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            unread_only: false,
        }
    }

    pub fn unread_for(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            unread_only: true,
        }
    }
}
