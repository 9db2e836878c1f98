//! Generic record-actor framework.
//!
//! Every durable table in the storefront (products, carts, cart lines, orders,
//! order messages) is a [`ResourceActor`] holding one [`ActorEntity`] type.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that record types implement to be managed by actors
//! - [`ResourceActor`] - Generic actor that owns one table
//! - [`ResourceClient`] - Type-safe, cloneable client for an actor
//! - [`ActorClient`] - Default `get`/`delete` for table-specific clients
//! - [`ChangeEvent`] / [`Subscription`] - Change notifications for live views
//! - [`FrameworkError`] - Errors raised by the plumbing itself
//!
//! # Testing
//!
//! See the [`mock`] module for answering client requests from a script.

pub mod actor;
pub mod change;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use change::{ChangeEvent, ChangeKind, ChangeScope, Subscription};
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
