//! # System Lifecycle & Orchestration
//!
//! Starting, wiring and stopping the storefront.
//!
//! - [`StoreSystem`] spawns one record actor per table and hands out the
//!   typed clients. The orders actor gets its [`OrderNumbering`](crate::order_actor::OrderNumbering)
//!   context at `run()` time rather than at construction.
//! - [`Storefront`] sits on top: it owns the cart store, message feed and order
//!   placer, and follows the [`AuthSession`](crate::session::AuthSession) so
//!   that every identity change reloads the cart and rebinds the feed.
//! - [`setup_tracing`] initializes logging for the binary.
//!
//! ## Graceful Shutdown
//!
//! 1. `Storefront::shutdown` stops the identity follower and drops the feed
//!    subscription and every component holding a client.
//! 2. `StoreSystem::shutdown` drops the remaining clients; each actor sees its
//!    channel close, logs its final size and exits.
//! 3. All actor tasks are awaited.

pub mod store_system;
pub mod storefront;
pub mod tracing;

pub use store_system::StoreSystem;
pub use storefront::Storefront;
pub use tracing::setup_tracing;
