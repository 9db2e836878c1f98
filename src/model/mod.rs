//! Pure data structures (DTOs) for the storefront tables.
//!
//! The [`ActorEntity`](crate::framework::ActorEntity) implementations live in
//! the per-table actor modules.

pub mod cart;
pub mod error;
pub mod identity;
pub mod ids;
pub mod message;
pub mod order;
pub mod product;

pub use cart::*;
pub use error::*;
pub use identity::*;
pub use ids::*;
pub use message::*;
pub use order::*;
pub use product::*;
