//! # Change Notifications
//!
//! Every committed mutation in a `ResourceActor` is published as a
//! [`ChangeEvent`] on a broadcast channel. Consumers do not apply events
//! incrementally: a [`Subscription`] turns matching events into calls to a
//! re-fetch callback, so the consumer always rebuilds from a full read.

use std::future::Future;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// What happened to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A committed change to one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub table: &'static str,
    pub kind: ChangeKind,
    pub record_id: String,
    /// Identity the record is scoped to, if any.
    pub owner: Option<String>,
}

/// Which events a subscriber cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeScope {
    pub table: &'static str,
    pub owner: Option<String>,
}

impl ChangeScope {
    /// Events for `table` owned by `owner`.
    pub fn owned_by(table: &'static str, owner: impl Into<String>) -> Self {
        Self {
            table,
            owner: Some(owner.into()),
        }
    }

    /// Events for every row of `table`.
    pub fn table(table: &'static str) -> Self {
        Self { table, owner: None }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        if event.table != self.table {
            return false;
        }
        match &self.owner {
            Some(owner) => event.owner.as_deref() == Some(owner.as_str()),
            None => true,
        }
    }
}

/// A background task that invokes a callback for every matching change.
///
/// The task stops when the callback returns `false`, when the channel closes,
/// or when the `Subscription` is dropped (drop aborts the task).
#[derive(Debug)]
pub struct Subscription {
    scope: ChangeScope,
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Spawns the listener task.
    ///
    /// A lagged receiver has missed events of unknown scope, so it counts as a
    /// change and triggers the callback.
    pub fn spawn<F, Fut>(
        mut receiver: broadcast::Receiver<ChangeEvent>,
        scope: ChangeScope,
        mut on_change: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let task_scope = scope.clone();
        let handle = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) if task_scope.matches(&event) => {
                        debug!(table = event.table, kind = ?event.kind, record_id = %event.record_id, "Change received");
                        if !on_change().await {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(table = task_scope.table, skipped, "Subscriber lagged, re-fetching");
                        if !on_change().await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!(table = task_scope.table, "Subscription ended");
        });
        Self { scope, handle }
    }

    pub fn scope(&self) -> &ChangeScope {
        &self.scope
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
