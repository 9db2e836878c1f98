//! # Order Message Feed
//!
//! The notification inbox of the signed-in identity.
//!
//! The feed never applies change events itself. While bound to an identity it
//! holds a [`Subscription`] on that identity's `order_messages` rows, and
//! every matching insert, update or delete triggers a full re-read. Ordering
//! (newest first) and `unread_count` are always recomputed from that read.
//!
//! Reads are sequenced: a result is applied only if no newer read has been
//! applied, and rebinding discards every read still in flight.
//!
//! The bound identity and its subscription are swapped under one lock, so
//! concurrent rebinds always leave the feed live on the identity it shows.
//! Rebinding drops the old subscription before the new one is created. The
//! subscription task only holds a weak reference to the feed, so dropping the
//! last feed handle also ends the task.

pub mod error;

pub use error::FeedError;

use crate::clients::MessageClient;
use crate::framework::{ActorEntity, ChangeScope, Subscription};
use crate::model::{Identity, MessageId, OrderMessage, UserId};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// What observers of an [`OrderMessageFeed`] see.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedSnapshot {
    pub user_id: Option<UserId>,
    /// Newest first.
    pub messages: Vec<OrderMessage>,
    pub unread_count: usize,
    pub loading: bool,
}

#[derive(Debug, Default)]
struct FeedState {
    user_id: Option<UserId>,
    /// Live on `user_id`'s messages; `None` exactly when unbound.
    subscription: Option<Subscription>,
    messages: Vec<OrderMessage>,
    loading: Option<u64>,
    ticket: u64,
    /// Ticket of the newest read applied.
    applied: u64,
}

impl FeedState {
    fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            user_id: self.user_id.clone(),
            messages: self.messages.clone(),
            unread_count: self.messages.iter().filter(|m| !m.read).count(),
            loading: self.loading.is_some(),
        }
    }

    fn next_ticket(&mut self) -> u64 {
        self.ticket += 1;
        self.ticket
    }

    /// Settles the read `ticket`. Returns whether its result may be applied.
    fn finish_read(&mut self, ticket: u64) -> bool {
        if self.loading.is_some_and(|newest| newest <= ticket) {
            self.loading = None;
        }
        if ticket <= self.applied {
            return false;
        }
        self.applied = ticket;
        true
    }
}

struct Inner {
    messages: MessageClient,
    state: Mutex<FeedState>,
    snapshots: watch::Sender<FeedSnapshot>,
}

/// Handle to the feed. Clones share state.
#[derive(Clone)]
pub struct OrderMessageFeed {
    inner: Arc<Inner>,
}

impl OrderMessageFeed {
    pub fn new(messages: MessageClient) -> Self {
        let (snapshots, _) = watch::channel(FeedSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                messages,
                state: Mutex::new(FeedState::default()),
                snapshots,
            }),
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut FeedState) -> R) -> R {
        let mut state = self.inner.state.lock();
        let result = f(&mut state);
        self.inner.snapshots.send_replace(state.snapshot());
        result
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.inner.state.lock().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.inner.snapshots.subscribe()
    }

    pub fn unread_count(&self) -> usize {
        self.inner.state.lock().messages.iter().filter(|m| !m.read).count()
    }

    /// Whether a change subscription is currently held.
    pub fn is_live(&self) -> bool {
        self.inner.state.lock().subscription.is_some()
    }

    /// The scope of the held change subscription.
    pub fn live_scope(&self) -> Option<ChangeScope> {
        self.inner
            .state
            .lock()
            .subscription
            .as_ref()
            .map(|sub| sub.scope().clone())
    }

    /// Binds the feed to `identity`, or empties and unbinds it.
    ///
    /// The previous subscription is torn down first, even when the identity
    /// is unchanged.
    #[instrument(skip_all, fields(user_id = ?identity.map(|i| i.id.as_str())))]
    pub async fn set_identity(&self, identity: Option<&Identity>) {
        let user_id = identity.map(|i| i.id.clone());
        let bound = self.update(|s| {
            if let Some(previous) = s.subscription.take() {
                debug!(scope = ?previous.scope(), "Unsubscribed");
            }
            s.applied = s.next_ticket();
            s.user_id = user_id.clone();
            s.messages.clear();
            s.loading = None;
            s.subscription = user_id.as_ref().map(|user_id| self.watch_messages(user_id));
            s.subscription.is_some()
        });

        if !bound {
            debug!("Feed unbound");
            return;
        }
        info!("Feed bound");
        self.fetch().await;
    }

    fn watch_messages(&self, user_id: &UserId) -> Subscription {
        let scope = ChangeScope::owned_by(OrderMessage::TABLE, user_id.as_str());
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        Subscription::spawn(self.inner.messages.subscribe(), scope, move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => {
                        OrderMessageFeed { inner }.fetch().await;
                        true
                    }
                    None => false,
                }
            }
        })
    }

    /// Re-reads all messages of the bound identity. Without one the feed is
    /// empty and not loading. A failed read leaves the feed empty.
    #[instrument(skip(self))]
    pub async fn fetch(&self) {
        let started = self.update(|s| {
            let user_id = s.user_id.clone()?;
            let ticket = s.next_ticket();
            s.loading = Some(ticket);
            Some((user_id, ticket))
        });
        let Some((user_id, ticket)) = started else {
            return;
        };

        let result = self.inner.messages.list_for_user(&user_id).await;

        self.update(|s| {
            if !s.finish_read(ticket) {
                debug!(ticket, applied = s.applied, "Stale feed read dropped");
                return;
            }
            s.messages = result.unwrap_or_else(|e| {
                warn!(user_id = %user_id, error = %e, "Message read failed, showing empty feed");
                Vec::new()
            });
            debug!(messages = s.messages.len(), "Feed refreshed");
        });
    }

    /// Marks one message read, then re-reads. Marking an already-read message
    /// changes nothing.
    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: MessageId) -> Result<(), FeedError> {
        self.inner.messages.mark_read(id).await?;
        self.fetch().await;
        Ok(())
    }

    /// Marks every unread message of the bound identity, then re-reads.
    /// Returns how many changed. No-op without an identity.
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self) -> Result<usize, FeedError> {
        let Some(user_id) = self.inner.state.lock().user_id.clone() else {
            return Ok(0);
        };
        let changed = self.inner.messages.mark_all_read(&user_id).await?;
        info!(user_id = %user_id, changed, "Messages marked read");
        self.fetch().await;
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockClient;
    use crate::framework::FrameworkError;
    use crate::model::{MessageSender, MessageType, OrderId};
    use chrono::{Duration, Utc};

    fn message(id: u32, user: &str, read: bool, age_minutes: i64) -> OrderMessage {
        OrderMessage {
            id: MessageId(id),
            order_id: OrderId(1),
            user_id: UserId::from(user),
            sender: MessageSender::System,
            message_type: MessageType::General,
            body: format!("notice {id}"),
            read,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn test_no_identity_is_empty_and_idle() {
        let mock = MockClient::<OrderMessage>::new();
        let feed = OrderMessageFeed::new(MessageClient::new(mock.client()));

        feed.set_identity(None).await;
        feed.fetch().await;

        assert_eq!(feed.snapshot(), FeedSnapshot::default());
        assert!(!feed.is_live());
        mock.verify();
    }

    #[tokio::test]
    async fn test_fetch_orders_newest_first_and_counts_unread() {
        let mut mock = MockClient::<OrderMessage>::new();
        mock.expect_list().return_ok(vec![
            message(1, "u1", true, 30),
            message(2, "u1", false, 5),
            message(3, "u1", false, 10),
        ]);
        let feed = OrderMessageFeed::new(MessageClient::new(mock.client()));

        feed.set_identity(Some(&Identity::new("u1"))).await;

        let snapshot = feed.snapshot();
        let ids: Vec<u32> = snapshot.messages.iter().map(|m| m.id.0).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(snapshot.unread_count, 2);
        assert!(!snapshot.loading);
        assert!(feed.is_live());
        mock.verify();
    }

    #[tokio::test]
    async fn test_read_failure_leaves_feed_empty() {
        let mut mock = MockClient::<OrderMessage>::new();
        mock.expect_list().return_err(FrameworkError::ActorClosed);
        let feed = OrderMessageFeed::new(MessageClient::new(mock.client()));

        feed.set_identity(Some(&Identity::new("u1"))).await;

        assert!(feed.snapshot().messages.is_empty());
        assert_eq!(feed.unread_count(), 0);
        mock.verify();
    }

    #[tokio::test]
    async fn test_failed_mark_read_is_surfaced() {
        let mut mock = MockClient::<OrderMessage>::new();
        mock.expect_list().return_ok(vec![message(4, "u1", false, 1)]);
        mock.expect_update(MessageId(4))
            .return_err(FrameworkError::ActorDropped);
        let feed = OrderMessageFeed::new(MessageClient::new(mock.client()));
        feed.set_identity(Some(&Identity::new("u1"))).await;

        let result = feed.mark_read(MessageId(4)).await;

        assert!(matches!(result, Err(FeedError::Transaction(_))));
        assert_eq!(feed.unread_count(), 1);
        mock.verify();
    }

    #[tokio::test]
    async fn test_failed_mark_all_read_keeps_unread_count() {
        let mut mock = MockClient::<OrderMessage>::new();
        mock.expect_list().return_ok(vec![
            message(5, "u1", false, 2),
            message(6, "u1", false, 1),
        ]);
        mock.expect_update_where()
            .return_err(FrameworkError::ActorClosed);
        let feed = OrderMessageFeed::new(MessageClient::new(mock.client()));
        feed.set_identity(Some(&Identity::new("u1"))).await;

        let result = feed.mark_all_read().await;

        assert!(matches!(result, Err(FeedError::Transaction(_))));
        assert_eq!(feed.unread_count(), 2);
        mock.verify();
    }

    #[tokio::test]
    async fn test_unbinding_drops_the_subscription() {
        let mut mock = MockClient::<OrderMessage>::new();
        mock.expect_list().return_ok(vec![]);
        let feed = OrderMessageFeed::new(MessageClient::new(mock.client()));

        feed.set_identity(Some(&Identity::new("u1"))).await;
        assert!(feed.is_live());
        feed.set_identity(None).await;

        assert!(!feed.is_live());
        mock.verify();
    }
}
