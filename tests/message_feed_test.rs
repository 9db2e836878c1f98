use std::time::Duration;
use storefront_sync::config::StorefrontConfig;
use storefront_sync::framework::{ActorEntity, ChangeScope};
use storefront_sync::lifecycle::StoreSystem;
use storefront_sync::message_feed::{FeedSnapshot, OrderMessageFeed};
use storefront_sync::model::{
    Identity, MessageCreate, MessageId, MessageType, OrderId, OrderMessage, UserId,
};

async fn post(system: &StoreSystem, user: &str, body: &str) -> MessageId {
    system
        .messages
        .post(MessageCreate::system(
            OrderId(1),
            UserId::from(user),
            MessageType::General,
            body,
        ))
        .await
        .expect("Failed to post message")
}

/// Waits until the feed publishes a snapshot satisfying `ready`.
async fn wait_for(feed: &OrderMessageFeed, ready: impl FnMut(&FeedSnapshot) -> bool) -> FeedSnapshot {
    let mut snapshots = feed.subscribe();
    let snapshot = tokio::time::timeout(Duration::from_secs(2), snapshots.wait_for(ready))
        .await
        .expect("feed did not update in time")
        .expect("feed dropped");
    snapshot.clone()
}

/// New messages show up without an explicit fetch, newest first.
#[tokio::test]
async fn test_feed_refetches_on_new_messages() {
    let system = StoreSystem::new(&StorefrontConfig::default());
    post(&system, "u1", "first").await;
    let feed = OrderMessageFeed::new(system.messages.clone());

    feed.set_identity(Some(&Identity::new("u1"))).await;
    assert_eq!(feed.snapshot().messages.len(), 1);

    post(&system, "u1", "second").await;
    let snapshot = wait_for(&feed, |s| s.messages.len() == 2 && !s.loading).await;

    assert_eq!(snapshot.messages[0].body, "second");
    assert_eq!(snapshot.messages[1].body, "first");
    assert_eq!(snapshot.unread_count, 2);

    feed.set_identity(None).await;
    drop(feed);
    system.shutdown().await.unwrap();
}

/// Marking read is monotonic and `mark_all_read` always ends at zero.
#[tokio::test]
async fn test_read_flags_are_monotonic() {
    let system = StoreSystem::new(&StorefrontConfig::default());
    let first = post(&system, "u1", "receipt").await;
    post(&system, "u1", "preparing").await;
    post(&system, "u1", "delivered").await;
    let feed = OrderMessageFeed::new(system.messages.clone());
    feed.set_identity(Some(&Identity::new("u1"))).await;
    assert_eq!(feed.unread_count(), 3);

    feed.mark_read(first).await.unwrap();
    assert_eq!(feed.unread_count(), 2);
    feed.mark_read(first).await.unwrap();
    assert_eq!(feed.unread_count(), 2);

    assert_eq!(feed.mark_all_read().await.unwrap(), 2);
    assert_eq!(feed.unread_count(), 0);
    assert_eq!(feed.mark_all_read().await.unwrap(), 0);
    assert_eq!(feed.unread_count(), 0);
    assert!(system
        .messages
        .list_for_user(&UserId::from("u1"))
        .await
        .unwrap()
        .iter()
        .all(|m| m.read));

    feed.set_identity(None).await;
    drop(feed);
    system.shutdown().await.unwrap();
}

/// Other identities' messages are neither shown nor counted, before or after
/// switching identity.
#[tokio::test]
async fn test_identity_switch_rebinds_the_feed() {
    let system = StoreSystem::new(&StorefrontConfig::default());
    post(&system, "u1", "for u1").await;
    post(&system, "u2", "for u2").await;
    let feed = OrderMessageFeed::new(system.messages.clone());

    feed.set_identity(Some(&Identity::new("u1"))).await;
    assert_eq!(feed.snapshot().messages[0].body, "for u1");

    feed.set_identity(Some(&Identity::new("u2"))).await;
    let snapshot = feed.snapshot();
    assert_eq!(snapshot.user_id, Some(UserId::from("u2")));
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.messages[0].body, "for u2");

    post(&system, "u1", "u1 again").await;
    post(&system, "u2", "u2 again").await;
    let snapshot = wait_for(&feed, |s| s.messages.len() == 2 && !s.loading).await;
    assert!(snapshot.messages.iter().all(|m| m.user_id == UserId::from("u2")));

    feed.set_identity(None).await;
    assert_eq!(feed.snapshot(), FeedSnapshot::default());
    assert!(!feed.is_live());

    drop(feed);
    system.shutdown().await.unwrap();
}

/// Rebinds racing on worker threads always leave the feed live on the
/// identity it shows.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rebinds_stay_live_on_the_shown_identity() {
    let system = StoreSystem::new(&StorefrontConfig::default());
    let feed = OrderMessageFeed::new(system.messages.clone());

    for round in 0..25 {
        let (a, b) = tokio::join!(
            tokio::spawn({
                let feed = feed.clone();
                async move { feed.set_identity(Some(&Identity::new("u1"))).await }
            }),
            tokio::spawn({
                let feed = feed.clone();
                async move { feed.set_identity(Some(&Identity::new("u2"))).await }
            }),
        );
        a.unwrap();
        b.unwrap();

        let shown = feed.snapshot().user_id.expect("feed is bound");
        assert_eq!(
            feed.live_scope(),
            Some(ChangeScope::owned_by(OrderMessage::TABLE, shown.as_str())),
            "round {round}"
        );

        let body = format!("round {round}");
        post(&system, shown.as_str(), &body).await;
        let snapshot = wait_for(&feed, |s| s.messages.iter().any(|m| m.body == body)).await;
        assert!(snapshot.messages.iter().all(|m| m.user_id == shown));
    }

    feed.set_identity(None).await;
    assert_eq!(feed.live_scope(), None);
    drop(feed);
    system.shutdown().await.unwrap();
}

/// A dropped feed stops listening, and the store keeps working.
#[tokio::test]
async fn test_dropped_feed_does_not_linger() {
    let system = StoreSystem::new(&StorefrontConfig::default());
    let feed = OrderMessageFeed::new(system.messages.clone());
    feed.set_identity(Some(&Identity::new("u1"))).await;
    assert!(feed.is_live());

    drop(feed);
    tokio::time::sleep(Duration::from_millis(10)).await;
    post(&system, "u1", "nobody listening").await;

    let stored = system.messages.list_for_user(&UserId::from("u1")).await.unwrap();
    assert_eq!(stored.len(), 1);
    system.shutdown().await.unwrap();
}
