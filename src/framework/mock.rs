//! # Mock Framework & Testing Guide
//!
//! `MockClient<T>` hands out a real `ResourceClient<T>` whose requests are
//! answered from a queue of expectations instead of by a `ResourceActor`. It
//! lets tests drive the cart, feed and placement logic into failure paths that
//! are awkward to reach with a live actor, such as a write that fails after an
//! optimistic change has already been applied.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **Speed** | Instant (in-memory) | Fast (but involves tokio spawn) |
//! | **Determinism** | Fully scripted | Subject to scheduler |
//! | **State** | No real state (expectations) | Real state management |
//! | **Use Case** | Logic *around* the client | The table itself or the full system |
//! | **Error Injection** | Easy (`return_err`) | Hard (requires specific state) |
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut lines = MockClient::<CartLine>::new();
//! lines.expect_list().return_ok(vec![]);
//! lines.expect_upsert().return_err(FrameworkError::ActorClosed);
//!
//! let store = CartStore::new(products.client(), carts.client(), lines.client(), "/placeholder.png");
//! // ... drive the store ...
//! lines.verify();
//! ```
//!
//! ## Unexpected Requests
//!
//! A request that does not match the head of the queue (wrong operation, wrong
//! id, or an empty queue) is answered with `FrameworkError::NotFound` and
//! recorded. [`MockClient::verify`] panics if anything was recorded or if
//! expectations remain.

use crate::framework::change::ChangeEvent;
use crate::framework::client::ResourceClient;
use crate::framework::entity::ActorEntity;
use crate::framework::error::FrameworkError;
use crate::framework::message::ResourceRequest;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the response to give it.
enum Expectation<T: ActorEntity> {
    Create(Result<T::Id, FrameworkError>),
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Update {
        id: T::Id,
        response: Result<T, FrameworkError>,
    },
    Delete {
        id: T::Id,
        response: Result<(), FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
    List(Result<Vec<T>, FrameworkError>),
    Upsert(Result<T, FrameworkError>),
    UpdateWhere(Result<usize, FrameworkError>),
    DeleteWhere(Result<usize, FrameworkError>),
}

impl<T: ActorEntity> Expectation<T> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Get { .. } => "get",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Action { .. } => "action",
            Self::List(_) => "list",
            Self::Upsert(_) => "upsert",
            Self::UpdateWhere(_) => "update_where",
            Self::DeleteWhere(_) => "delete_where",
        }
    }
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking for fluent testing.
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    changes: broadcast::Sender<ChangeEvent>,
    expectations: Queue<T>,
    failures: Arc<Mutex<Vec<String>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let (changes, _) = broadcast::channel(64);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let failures = Arc::new(Mutex::new(Vec::new()));

        let queue = expectations.clone();
        let recorded = failures.clone();
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = queue.lock().pop_front();
                if let Err(reason) = answer(request, expectation) {
                    tracing::warn!(table = T::TABLE, %reason, "Mock mismatch");
                    recorded.lock().push(reason);
                }
            }
        });

        Self {
            client: ResourceClient::new(sender, changes.clone()),
            changes,
            expectations,
            failures,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// Publishes `event` to subscribers of the mock's client.
    pub fn emit(&self, event: ChangeEvent) {
        let _ = self.changes.send(event);
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        self.builder(Expectation::Create)
    }

    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(move |response| Expectation::Get { id, response })
    }

    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |response| Expectation::Update { id, response })
    }

    pub fn expect_delete(&mut self, id: T::Id) -> ExpectationBuilder<T, ()> {
        self.builder(move |response| Expectation::Delete { id, response })
    }

    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        self.builder(move |response| Expectation::Action { id, response })
    }

    pub fn expect_list(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        self.builder(Expectation::List)
    }

    pub fn expect_upsert(&mut self) -> ExpectationBuilder<T, T> {
        self.builder(Expectation::Upsert)
    }

    pub fn expect_update_where(&mut self) -> ExpectationBuilder<T, usize> {
        self.builder(Expectation::UpdateWhere)
    }

    pub fn expect_delete_where(&mut self) -> ExpectationBuilder<T, usize> {
        self.builder(Expectation::DeleteWhere)
    }

    fn builder<R>(
        &self,
        wrap: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send + 'static,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            wrap: Box::new(wrap),
            expectations: self.expectations.clone(),
        }
    }

    /// Verifies that all expectations were met and nothing unexpected arrived.
    pub fn verify(&self) {
        let failures = self.failures.lock();
        if !failures.is_empty() {
            panic!("Unexpected requests: {:?}", *failures);
        }
        let exps = self.expectations.lock();
        if !exps.is_empty() {
            let pending: Vec<&str> = exps.iter().map(Expectation::kind).collect();
            panic!("Not all expectations were met. Remaining: {:?}", pending);
        }
    }
}

/// Builder that queues one expectation.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    wrap: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send>,
    expectations: Queue<T>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        let expectation = (self.wrap)(Ok(value));
        self.expectations.lock().push_back(expectation);
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        let expectation = (self.wrap)(Err(error));
        self.expectations.lock().push_back(expectation);
    }
}

/// Answers `request` from `expectation`, or rejects it and explains why.
fn answer<T: ActorEntity>(
    request: ResourceRequest<T>,
    expectation: Option<Expectation<T>>,
) -> Result<(), String> {
    match (request, expectation) {
        (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create(response))) => {
            let _ = respond_to.send(response);
        }
        (
            ResourceRequest::Get { id, respond_to },
            Some(Expectation::Get {
                id: expected,
                response,
            }),
        ) if id == expected => {
            let _ = respond_to.send(response);
        }
        (
            ResourceRequest::Update { id, respond_to, .. },
            Some(Expectation::Update {
                id: expected,
                response,
            }),
        ) if id == expected => {
            let _ = respond_to.send(response);
        }
        (
            ResourceRequest::Delete { id, respond_to },
            Some(Expectation::Delete {
                id: expected,
                response,
            }),
        ) if id == expected => {
            let _ = respond_to.send(response);
        }
        (
            ResourceRequest::Action { id, respond_to, .. },
            Some(Expectation::Action {
                id: expected,
                response,
            }),
        ) if id == expected => {
            let _ = respond_to.send(response);
        }
        (ResourceRequest::List { respond_to, .. }, Some(Expectation::List(response))) => {
            let _ = respond_to.send(response);
        }
        (ResourceRequest::Upsert { respond_to, .. }, Some(Expectation::Upsert(response))) => {
            let _ = respond_to.send(response);
        }
        (
            ResourceRequest::UpdateWhere { respond_to, .. },
            Some(Expectation::UpdateWhere(response)),
        ) => {
            let _ = respond_to.send(response);
        }
        (
            ResourceRequest::DeleteWhere { respond_to, .. },
            Some(Expectation::DeleteWhere(response)),
        ) => {
            let _ = respond_to.send(response);
        }
        (request, expectation) => {
            let reason = format!(
                "{} request while expecting {}",
                request.kind(),
                expectation.as_ref().map_or("nothing", Expectation::kind)
            );
            reject(request, &reason);
            return Err(reason);
        }
    }
    Ok(())
}

fn reject<T: ActorEntity>(request: ResourceRequest<T>, reason: &str) {
    let error = || FrameworkError::NotFound(format!("unexpected {}", reason));
    match request {
        ResourceRequest::Create { respond_to, .. } => {
            let _ = respond_to.send(Err(error()));
        }
        ResourceRequest::Get { respond_to, .. } => {
            let _ = respond_to.send(Err(error()));
        }
        ResourceRequest::Update { respond_to, .. } => {
            let _ = respond_to.send(Err(error()));
        }
        ResourceRequest::Delete { respond_to, .. } => {
            let _ = respond_to.send(Err(error()));
        }
        ResourceRequest::Action { respond_to, .. } => {
            let _ = respond_to.send(Err(error()));
        }
        ResourceRequest::List { respond_to, .. } => {
            let _ = respond_to.send(Err(error()));
        }
        ResourceRequest::Upsert { respond_to, .. } => {
            let _ = respond_to.send(Err(error()));
        }
        ResourceRequest::UpdateWhere { respond_to, .. } => {
            let _ = respond_to.send(Err(error()));
        }
        ResourceRequest::DeleteWhere { respond_to, .. } => {
            let _ = respond_to.send(Err(error()));
        }
    }
}

// =============================================================================
// LOW-LEVEL HELPERS
// =============================================================================

/// Creates a client and the receiving end of its request channel.
///
/// Tests that need to hold a request open (to observe state while a write is
/// in flight) take requests off `receiver` themselves and answer whenever they
/// choose.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let (changes, _) = broadcast::channel(16);
    (ResourceClient::new(sender, changes), receiver)
}

/// Helper to take the next request if it is an Update.
pub async fn expect_update<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Update,
    tokio::sync::oneshot::Sender<Result<T, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update {
            id,
            update,
            respond_to,
        }) => Some((id, update, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Tag {
        id: u32,
        label: String,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("tag error")]
    struct TagError;

    #[async_trait]
    impl ActorEntity for Tag {
        const TABLE: &'static str = "tags";
        type Id = u32;
        type Create = String;
        type Update = String;
        type Action = ();
        type ActionResult = ();
        type Filter = ();
        type Context = ();
        type Error = TagError;

        fn from_create_params(id: u32, label: String) -> Result<Self, TagError> {
            Ok(Self { id, label })
        }

        fn matches(&self, _filter: &()) -> bool {
            true
        }

        async fn on_update(&mut self, label: String, _ctx: &()) -> Result<(), TagError> {
            self.label = label;
            Ok(())
        }

        async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), TagError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mock_answers_in_order() {
        let mut mock = MockClient::<Tag>::new();
        mock.expect_create().return_ok(7);
        mock.expect_get(7).return_ok(Some(Tag {
            id: 7,
            label: "spicy".into(),
        }));
        mock.expect_update(7).return_err(FrameworkError::ActorClosed);

        let client = mock.client();
        assert_eq!(client.create("spicy".into()).await.unwrap(), 7);
        assert_eq!(client.get(7).await.unwrap().unwrap().label, "spicy");
        assert!(matches!(
            client.update(7, "mild".into()).await,
            Err(FrameworkError::ActorClosed)
        ));
        mock.verify();
    }

    #[tokio::test]
    async fn test_wrong_id_is_rejected() {
        let mut mock = MockClient::<Tag>::new();
        mock.expect_delete(1).return_ok(());

        let client = mock.client();
        assert!(matches!(
            client.delete(2).await,
            Err(FrameworkError::NotFound(_))
        ));
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected requests")]
    async fn test_verify_reports_unexpected_requests() {
        let mock = MockClient::<Tag>::new();
        let _ = mock.client().list(()).await;
        mock.verify();
    }

    #[tokio::test]
    async fn test_emit_reaches_subscribers() {
        let mock = MockClient::<Tag>::new();
        let mut changes = mock.client().subscribe();
        mock.emit(ChangeEvent {
            table: "tags",
            kind: crate::framework::ChangeKind::Insert,
            record_id: "1".into(),
            owner: None,
        });
        assert_eq!(changes.recv().await.unwrap().table, "tags");
    }
}
