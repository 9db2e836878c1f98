#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Storefront Sync
//!
//! > **The client-side core of a food-ordering storefront, on resource-oriented actors.**
//!
//! A customer browses the catalog, fills a cart, checks out, receives order
//! messages and rates delivered orders. This crate keeps the in-memory view of
//! all that consistent with a durable store, and realises the store itself as
//! one Tokio actor per table.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Optimistic, then reconcile
//! Every cart mutation changes the in-memory lines first, so observers see it
//! immediately, and then writes through to the store. Failed writes revert
//! their own change. A full reload after the write replaces in-memory state
//! wholesale, so the store stays the source of truth.
//!
//! ### Push-triggered re-pull
//! Change notifications never patch state directly. The message feed treats a
//! matching change as "something happened" and re-reads everything, which
//! keeps ordering and unread counts exact.
//!
//! ### Sequenced reads
//! Cart loads and feed reads carry tickets. A response that is no longer the
//! latest is dropped, so a slow read can never overwrite newer state.
//!
//! ## 🚀 Core Concepts
//!
//! ### Generics: The Power of `T`
//! `ResourceActor<T: ActorEntity>` holds records of any table. The request loop,
//! unique-key index, change broadcast and error plumbing are written once;
//! each table only supplies its hooks.
//!
//! ### Mocking: Testing without Pain
//! `MockClient` answers a real `ResourceClient` from scripted expectations,
//! which makes failed writes after an optimistic change easy to test.
//! See the [`framework::mock`] module for a complete guide.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! Record hooks reject writes with [`RecordError`](model::RecordError); table
//! clients recover it from the framework error as
//! [`StoreError`](clients::StoreError); components wrap that in their own
//! error (`CartError`, `PlaceOrderError`, `FeedError`, `RatingError`).
//! Read failures are never surfaced: they log at warn and fall back to empty.
//!
//! ### 2. Async Context Injection
//! The orders actor receives its numbering scheme at `run()` time, not at
//! construction time.
//!
//! ### 3. Concurrency Model
//! Each table actor processes its requests sequentially in its own task.
//! Component state lives behind a `parking_lot::Mutex` that is never held
//! across an `.await`; observers read snapshots through `tokio::sync::watch`.
//!
//! ### 4. Observability
//! `tracing` everywhere with structured fields. See the [`lifecycle::tracing`]
//! module for details.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! - **Role**: Generic record actor, client, change notifications and mocks.
//! - **Key items**: [`ActorEntity`](framework::ActorEntity), [`ResourceActor`](framework::ResourceActor),
//!   [`Subscription`](framework::Subscription).
//!
//! ### 2. The Tables ([`product_actor`], [`cart_actor`], [`cart_line_actor`], [`order_actor`], [`message_actor`])
//! - **Role**: `ActorEntity` implementations with the per-table invariants.
//!
//! ### 3. The Interface ([`clients`])
//! - **Role**: Domain operations per table, e.g. [`CartLineClient::increment_or_insert`](clients::CartLineClient::increment_or_insert).
//!
//! ### 4. The Storefront ([`cart_store`], [`order_placer`], [`message_feed`], [`rating`], [`catalog`])
//! - **Role**: What the UI talks to.
//!
//! ### 5. The Orchestrator ([`lifecycle`], [`session`], [`config`])
//! - **Role**: Starts the store, wires the components and follows the signed-in identity.
//! - **Key items**: [`StoreSystem`](lifecycle::StoreSystem), [`Storefront`](lifecycle::Storefront).
//!
//! ## 🚀 Quick Start
//!
//! ### Running the Demo
//!
//! ```bash
//! # Run with info logs
//! RUST_LOG=info cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod cart_actor;
pub mod cart_line_actor;
pub mod cart_store;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod framework;
pub mod fulfillment;
pub mod lifecycle;
pub mod message_actor;
pub mod message_feed;
pub mod model;
pub mod order_actor;
pub mod order_placer;
pub mod product_actor;
pub mod rating;
pub mod session;
