//! # Generic Client
//!
//! This module defines the generic client for communicating with record actors.

use crate::framework::change::ChangeEvent;
use crate::framework::entity::ActorEntity;
use crate::framework::error::FrameworkError;
use crate::framework::message::{ResourceRequest, Response};
use tokio::sync::{broadcast, mpsc, oneshot};

/// ## ResourceClient
///
/// The `ResourceClient<T>` provides a type-safe, async API for interacting with a
/// `ResourceActor<T>`. It forwards requests over a Tokio mpsc channel and returns
/// results via oneshot channels. Cloning is cheap and clones can be shared
/// across tasks.
///
/// The client also hands out receivers on the actor's change channel, so any
/// holder of a client can observe committed mutations.
pub struct ResourceClient<T: ActorEntity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
    changes: broadcast::Sender<ChangeEvent>,
}

// Manual impl: a derive would require `T: Clone` bounds on the payload types.
impl<T: ActorEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            changes: self.changes.clone(),
        }
    }
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(
        sender: mpsc::Sender<ResourceRequest<T>>,
        changes: broadcast::Sender<ChangeEvent>,
    ) -> Self {
        Self { sender, changes }
    }

    /// Sends one request and waits for its answer.
    async fn call<R>(
        &self,
        request: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::Create) -> Result<T::Id, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Update {
            id,
            update,
            respond_to,
        })
        .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.call(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Action {
            id,
            action,
            respond_to,
        })
        .await
    }

    /// All records matching `filter`, in ascending id order.
    pub async fn list(&self, filter: T::Filter) -> Result<Vec<T>, FrameworkError> {
        self.call(|respond_to| ResourceRequest::List { filter, respond_to })
            .await
    }

    /// Creates from `params`, or applies `update` to the record already holding
    /// the same unique key.
    pub async fn upsert(&self, params: T::Create, update: T::Update) -> Result<T, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Upsert {
            params,
            update,
            respond_to,
        })
        .await
    }

    /// Returns how many records were updated.
    pub async fn update_where(
        &self,
        filter: T::Filter,
        update: T::Update,
    ) -> Result<usize, FrameworkError> {
        self.call(|respond_to| ResourceRequest::UpdateWhere {
            filter,
            update,
            respond_to,
        })
        .await
    }

    /// Returns how many records were removed.
    pub async fn delete_where(&self, filter: T::Filter) -> Result<usize, FrameworkError> {
        self.call(|respond_to| ResourceRequest::DeleteWhere { filter, respond_to })
            .await
    }

    /// A receiver for changes committed after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
