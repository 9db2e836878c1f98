//! # ActorEntity Trait
//!
//! The contract every durable record (product, cart, cart line, order, order
//! message) implements to be held by a [`ResourceActor`](crate::framework::ResourceActor).
//!
//! Associated types fix the payloads per table, so a `CartLineCreate` can never
//! be sent to the orders actor. Beyond the CRUD hooks the trait describes three
//! storage concerns that the actor enforces generically:
//!
//! - **Unique keys** ([`ActorEntity::unique_key`] / [`ActorEntity::create_key`]):
//!   at most one record per key. Creates on a taken key fail with `Conflict`,
//!   upserts update the existing record instead.
//! - **Filters** ([`ActorEntity::matches`]): the predicate behind `list`,
//!   `update_where` and `delete_where`.
//! - **Ownership** ([`ActorEntity::owner`]): the identity a record is scoped to,
//!   stamped on every [`ChangeEvent`](crate::framework::ChangeEvent) so that
//!   subscribers can listen to their own rows only.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any record type must implement to be managed by `ResourceActor`.
///
/// # Async & Context
/// Hooks are `async` and receive the actor's `Context`, which is injected when the
/// actor starts running rather than when it is constructed.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Table name used in logs and change events.
    const TABLE: &'static str;

    /// Identifier allocated by the actor from a `u32` counter starting at 1.
    type Id: Eq + Ord + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new record.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing record.
    ///
    /// `Clone` because `update_where` applies one update to many records.
    type Update: Clone + Send + Sync + Debug;

    /// Record-specific operations beyond CRUD.
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// Query predicate for `list` and the bulk operations.
    type Filter: Send + Sync + Debug;

    /// The runtime context injected into every hook. Use `()` if none.
    type Context: Send + Sync;

    /// The error type raised by hooks.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the record from its allocated id and create payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Unique key of an existing record, if the table has one.
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Unique key a create payload would occupy. Must agree with [`ActorEntity::unique_key`].
    fn create_key(_params: &Self::Create) -> Option<String> {
        None
    }

    /// Identity this record is scoped to.
    fn owner(&self) -> Option<String> {
        None
    }

    /// Whether the record satisfies `filter`.
    fn matches(&self, filter: &Self::Filter) -> bool;

    // --- Lifecycle Hooks (Async) ---

    /// Called after construction, before the record is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    ///
    /// The actor runs this on a copy and only commits on success.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the record is removed.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a record-specific action. Runs on a copy, like `on_update`.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
