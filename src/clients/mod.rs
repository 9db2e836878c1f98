//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient),
//! one per table.

pub mod cart_client;
pub mod cart_line_client;
pub mod error;
pub mod message_client;
pub mod order_client;
pub mod product_client;

pub use cart_client::*;
pub use cart_line_client::*;
pub use error::*;
pub use message_client::*;
pub use order_client::*;
pub use product_client::*;
