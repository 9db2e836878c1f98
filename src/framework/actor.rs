//! # Generic Record Actor
//!
//! `ResourceActor` is the server half of a table. It owns the records, processes
//! requests one at a time and publishes a [`ChangeEvent`] after every committed
//! mutation.

use crate::framework::change::{ChangeEvent, ChangeKind};
use crate::framework::client::ResourceClient;
use crate::framework::entity::ActorEntity;
use crate::framework::error::FrameworkError;
use crate::framework::message::ResourceRequest;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

/// Lower bound for the change channel capacity.
const MIN_CHANGE_CAPACITY: usize = 64;

/// The generic actor that manages one table of records.
///
/// # Concurrency Model
/// Each actor processes its own messages sequentially in a loop, so the
/// `store` needs no lock. Hooks run against a copy of the record and the copy
/// is committed only when the hook succeeds, so a failing update never leaves
/// a half-applied record behind.
///
/// # Implementation Details
///
/// * `store` is ordered by id, which makes `list` results stable (ascending id).
/// * `keys` indexes [`ActorEntity::unique_key`] to enforce uniqueness and to
///   resolve upserts.
/// * Ids come from a `u32` counter that only advances on a successful create.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: BTreeMap<T::Id, T>,
    keys: HashMap<String, T::Id>,
    next_id: u32,
    changes: broadcast::Sender<ChangeEvent>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the capacity of the request channel; callers wait when
    /// it is full.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (changes, _) = broadcast::channel(buffer_size.max(MIN_CHANGE_CAPACITY));
        let client = ResourceClient::new(sender, changes.clone());
        let actor = Self {
            receiver,
            store: BTreeMap::new(),
            keys: HashMap::new(),
            next_id: 1,
            changes,
        };
        (actor, client)
    }

    /// Runs the actor's event loop until every client has been dropped.
    ///
    /// # Context Injection
    /// `context` is handed to every hook. It is supplied here rather than in
    /// `new()` so that actors can be wired after all clients exist.
    pub async fn run(mut self, context: T::Context) {
        let table = T::TABLE;
        info!(table, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(table, ?params, "Create");
                    let result = self.insert(params, &context).await.map(|(id, _)| id);
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(table, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(table, %id, ?update, "Update");
                    let result = self.update_record(id, update, &context).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(table, %id, "Delete");
                    let result = self.delete_record(id, &context).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(table, %id, ?action, "Action");
                    let result = self.run_action(id, action, &context).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::List { filter, respond_to } => {
                    let items: Vec<T> = self
                        .store
                        .values()
                        .filter(|item| item.matches(&filter))
                        .cloned()
                        .collect();
                    debug!(table, ?filter, count = items.len(), "List");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Upsert {
                    params,
                    update,
                    respond_to,
                } => {
                    debug!(table, ?params, ?update, "Upsert");
                    let result = self.upsert(params, update, &context).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::UpdateWhere {
                    filter,
                    update,
                    respond_to,
                } => {
                    debug!(table, ?filter, ?update, "UpdateWhere");
                    let result = self.update_where(&filter, update, &context).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::DeleteWhere { filter, respond_to } => {
                    debug!(table, ?filter, "DeleteWhere");
                    let result = self.delete_where(&filter, &context).await;
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(table, size = self.store.len(), "Shutdown");
    }

    async fn insert(
        &mut self,
        params: T::Create,
        context: &T::Context,
    ) -> Result<(T::Id, T), FrameworkError> {
        let table = T::TABLE;
        if let Some(key) = T::create_key(&params) {
            if self.keys.contains_key(&key) {
                warn!(table, %key, "Unique key taken");
                return Err(FrameworkError::Conflict(key));
            }
        }

        let id = T::Id::from(self.next_id);
        let mut item = T::from_create_params(id.clone(), params).map_err(|e| {
            warn!(table, error = %e, "Create failed");
            FrameworkError::entity(e)
        })?;
        item.on_create(context).await.map_err(|e| {
            warn!(table, error = %e, "on_create failed");
            FrameworkError::entity(e)
        })?;

        self.next_id += 1;
        if let Some(key) = item.unique_key() {
            self.keys.insert(key, id.clone());
        }
        self.store.insert(id.clone(), item.clone());
        info!(table, %id, size = self.store.len(), "Created");
        self.publish(ChangeKind::Insert, &id, &item);
        Ok((id, item))
    }

    async fn update_record(
        &mut self,
        id: T::Id,
        update: T::Update,
        context: &T::Context,
    ) -> Result<T, FrameworkError> {
        let table = T::TABLE;
        let Some(current) = self.store.get(&id) else {
            warn!(table, %id, "Not found");
            return Err(FrameworkError::NotFound(id.to_string()));
        };

        let mut next = current.clone();
        if let Err(e) = next.on_update(update, context).await {
            warn!(table, %id, error = %e, "Update failed");
            return Err(FrameworkError::entity(e));
        }

        self.commit(id.clone(), next.clone());
        info!(table, %id, "Updated");
        self.publish(ChangeKind::Update, &id, &next);
        Ok(next)
    }

    async fn delete_record(&mut self, id: T::Id, context: &T::Context) -> Result<(), FrameworkError> {
        let table = T::TABLE;
        let Some(item) = self.store.get(&id) else {
            warn!(table, %id, "Not found");
            return Err(FrameworkError::NotFound(id.to_string()));
        };
        if let Err(e) = item.on_delete(context).await {
            warn!(table, %id, error = %e, "on_delete failed");
            return Err(FrameworkError::entity(e));
        }

        if let Some(item) = self.remove(&id) {
            info!(table, %id, size = self.store.len(), "Deleted");
            self.publish(ChangeKind::Delete, &id, &item);
        }
        Ok(())
    }

    async fn run_action(
        &mut self,
        id: T::Id,
        action: T::Action,
        context: &T::Context,
    ) -> Result<T::ActionResult, FrameworkError> {
        let table = T::TABLE;
        let Some(current) = self.store.get(&id) else {
            warn!(table, %id, "Not found");
            return Err(FrameworkError::NotFound(id.to_string()));
        };

        let mut next = current.clone();
        match next.handle_action(action, context).await {
            Ok(result) => {
                self.commit(id.clone(), next.clone());
                info!(table, %id, "Action ok");
                self.publish(ChangeKind::Update, &id, &next);
                Ok(result)
            }
            Err(e) => {
                warn!(table, %id, error = %e, "Action failed");
                Err(FrameworkError::entity(e))
            }
        }
    }

    async fn upsert(
        &mut self,
        params: T::Create,
        update: T::Update,
        context: &T::Context,
    ) -> Result<T, FrameworkError> {
        let existing = T::create_key(&params).and_then(|key| self.keys.get(&key).cloned());
        match existing {
            Some(id) => self.update_record(id, update, context).await,
            None => self.insert(params, context).await.map(|(_, item)| item),
        }
    }

    /// Applies `update` to every matching record, or to none if any hook fails.
    async fn update_where(
        &mut self,
        filter: &T::Filter,
        update: T::Update,
        context: &T::Context,
    ) -> Result<usize, FrameworkError> {
        let table = T::TABLE;
        let matching: Vec<(T::Id, T)> = self
            .store
            .iter()
            .filter(|(_, item)| item.matches(filter))
            .map(|(id, item)| (id.clone(), item.clone()))
            .collect();

        let mut staged = Vec::with_capacity(matching.len());
        for (id, mut next) in matching {
            if let Err(e) = next.on_update(update.clone(), context).await {
                warn!(table, %id, error = %e, "Bulk update aborted");
                return Err(FrameworkError::entity(e));
            }
            staged.push((id, next));
        }

        let count = staged.len();
        for (id, next) in staged {
            self.commit(id.clone(), next.clone());
            self.publish(ChangeKind::Update, &id, &next);
        }
        info!(table, count, "Bulk updated");
        Ok(count)
    }

    /// Removes every matching record, or none if any `on_delete` hook fails.
    async fn delete_where(
        &mut self,
        filter: &T::Filter,
        context: &T::Context,
    ) -> Result<usize, FrameworkError> {
        let table = T::TABLE;
        let ids: Vec<T::Id> = self
            .store
            .iter()
            .filter(|(_, item)| item.matches(filter))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &ids {
            if let Some(item) = self.store.get(id) {
                if let Err(e) = item.on_delete(context).await {
                    warn!(table, %id, error = %e, "Bulk delete aborted");
                    return Err(FrameworkError::entity(e));
                }
            }
        }

        for id in &ids {
            if let Some(item) = self.remove(id) {
                self.publish(ChangeKind::Delete, id, &item);
            }
        }
        info!(table, count = ids.len(), size = self.store.len(), "Bulk deleted");
        Ok(ids.len())
    }

    /// Stores `next` under `id`, keeping the unique-key index in step.
    fn commit(&mut self, id: T::Id, next: T) {
        let old_key = self.store.get(&id).and_then(T::unique_key);
        let new_key = next.unique_key();
        if old_key != new_key {
            if let Some(old) = old_key {
                self.keys.remove(&old);
            }
            if let Some(new) = new_key {
                self.keys.insert(new, id.clone());
            }
        }
        self.store.insert(id, next);
    }

    fn remove(&mut self, id: &T::Id) -> Option<T> {
        let item = self.store.remove(id)?;
        if let Some(key) = item.unique_key() {
            self.keys.remove(&key);
        }
        Some(item)
    }

    fn publish(&self, kind: ChangeKind, id: &T::Id, item: &T) {
        // No receivers is not an error.
        let _ = self.changes.send(ChangeEvent {
            table: T::TABLE,
            kind,
            record_id: id.to_string(),
            owner: item.owner(),
        });
    }
}
