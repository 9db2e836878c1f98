use crate::clients::{CartClient, CartLineClient, MessageClient, OrderClient, ProductClient};
use crate::config::StorefrontConfig;
use crate::order_actor::OrderNumbering;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

/// Runtime owner of the durable store: one record actor per table.
///
/// # Architecture
///
/// - **products**: the catalog
/// - **carts** / **cart_items**: per-user carts and their lines
/// - **orders**: placed orders; the actor's context is the [`OrderNumbering`] scheme
/// - **order_messages**: receipts, rating prompts and notices
///
/// # Example
///
/// ```ignore
/// let system = StoreSystem::new(&StorefrontConfig::default());
/// let cart = system.carts.upsert_for(&user_id).await?;
/// system.shutdown().await?;
/// ```
pub struct StoreSystem {
    pub products: ProductClient,
    pub carts: CartClient,
    pub cart_lines: CartLineClient,
    pub orders: OrderClient,
    pub messages: MessageClient,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<JoinHandle<()>>,
}

impl StoreSystem {
    /// Spawns every table actor. Must be called from within a Tokio runtime.
    pub fn new(config: &StorefrontConfig) -> Self {
        let buffer = config.actor_buffer;

        // 1. Create actors (no dependencies)
        let (product_actor, products) = crate::product_actor::new(buffer);
        let (cart_actor, carts) = crate::cart_actor::new(buffer);
        let (line_actor, cart_lines) = crate::cart_line_actor::new(buffer);
        let (order_actor, orders) = crate::order_actor::new(buffer);
        let (message_actor, messages) = crate::message_actor::new(buffer);

        // 2. Start actors with injected context
        let handles = vec![
            tokio::spawn(product_actor.run(())),
            tokio::spawn(cart_actor.run(())),
            tokio::spawn(line_actor.run(())),
            tokio::spawn(order_actor.run(OrderNumbering::new(config.order_prefix.clone()))),
            tokio::spawn(message_actor.run(())),
        ];
        info!(tables = handles.len(), "Store started");

        Self {
            products,
            carts,
            cart_lines,
            orders,
            messages,
            handles,
        }
    }

    /// Gracefully shuts down the store.
    ///
    /// Dropping the clients closes each actor's channel; the actors drain and
    /// exit. Clones still held elsewhere keep their actor alive, so callers
    /// must release those first (see [`Storefront::shutdown`](crate::lifecycle::Storefront::shutdown)).
    pub async fn shutdown(self) -> Result<(), JoinError> {
        info!("Shutting down store...");
        drop(self.products);
        drop(self.carts);
        drop(self.cart_lines);
        drop(self.orders);
        drop(self.messages);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(e);
            }
        }

        info!("Store shutdown complete.");
        Ok(())
    }
}
