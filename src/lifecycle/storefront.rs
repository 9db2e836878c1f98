use crate::cart_store::CartStore;
use crate::catalog::ProductCatalog;
use crate::clients::OrderClient;
use crate::config::StorefrontConfig;
use crate::fulfillment::Fulfillment;
use crate::lifecycle::StoreSystem;
use crate::message_feed::OrderMessageFeed;
use crate::model::{Identity, Order};
use crate::order_placer::{
    CheckoutSelections, OrderPlacer, PlaceOrderError, PlaceOrderPayload, PlacedOrder,
    StoreEndpoint,
};
use crate::rating::RatingFlow;
use crate::session::AuthSession;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, instrument, warn};

/// The storefront components wired to one [`StoreSystem`] and one
/// [`AuthSession`].
///
/// A background task follows the session: every identity change reloads the
/// cart and rebinds the message feed.
pub struct Storefront {
    pub session: AuthSession,
    pub catalog: ProductCatalog,
    pub cart: CartStore,
    pub feed: OrderMessageFeed,
    pub placer: OrderPlacer,
    /// Fulfillment-side writes (status changes, notices).
    pub fulfillment: Fulfillment,
    orders: OrderClient,
    follower: JoinHandle<()>,
    system: StoreSystem,
}

impl Storefront {
    /// Wires the components and starts following `session`. Must be called
    /// from within a Tokio runtime.
    pub fn new(system: StoreSystem, config: &StorefrontConfig, session: AuthSession) -> Self {
        let catalog = ProductCatalog::new(system.products.clone());
        let cart = CartStore::new(
            system.products.clone(),
            system.carts.clone(),
            system.cart_lines.clone(),
            config.placeholder_image.clone(),
        );
        let feed = OrderMessageFeed::new(system.messages.clone());
        let fulfillment = Fulfillment::new(system.orders.clone(), system.messages.clone());
        let endpoint = StoreEndpoint::new(
            system.products.clone(),
            system.orders.clone(),
            fulfillment.clone(),
            config.delivery_fee,
        );
        let placer = OrderPlacer::new(Arc::new(endpoint));
        let follower = tokio::spawn(follow_identity(session.watch(), cart.clone(), feed.clone()));

        Self {
            session,
            catalog,
            cart,
            feed,
            placer,
            fulfillment,
            orders: system.orders.clone(),
            follower,
            system,
        }
    }

    pub fn store(&self) -> &StoreSystem {
        &self.system
    }

    /// Applies the current identity right away instead of waiting for the
    /// follower task.
    pub async fn sync_identity(&self) {
        let identity = self.session.current();
        tokio::join!(
            self.cart.load(identity.as_ref()),
            self.feed.set_identity(identity.as_ref())
        );
    }

    /// Places an order for the current cart and empties the cart once the
    /// order is stored.
    ///
    /// A failure to clear the cart is logged; the order stands.
    #[instrument(skip_all, fields(mode = %selections.delivery_mode))]
    pub async fn checkout(
        &self,
        selections: &CheckoutSelections,
    ) -> Result<PlacedOrder, PlaceOrderError> {
        let snapshot = self.cart.snapshot();
        let payload = PlaceOrderPayload::from_cart(&snapshot.lines, selections);
        let placed = self.placer.place(snapshot.user_id.as_ref(), &payload).await?;

        if let Err(e) = self.cart.clear_cart().await {
            warn!(order_id = %placed.order_id, error = %e, "Order placed but cart not cleared");
        }
        Ok(placed)
    }

    pub fn rating_flow(&self, order: &Order) -> RatingFlow {
        RatingFlow::for_order(self.orders.clone(), order)
    }

    /// Stops the follower, unbinds the feed, then shuts the store down.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        info!("Shutting down storefront...");
        self.follower.abort();
        match self.follower.await {
            Err(e) if !e.is_cancelled() => return Err(e),
            _ => {}
        }
        self.feed.set_identity(None).await;

        let system = self.system;
        drop(self.placer);
        drop(self.fulfillment);
        drop(self.catalog);
        drop(self.cart);
        drop(self.feed);
        drop(self.orders);
        system.shutdown().await
    }
}

async fn follow_identity(
    mut identities: watch::Receiver<Option<Identity>>,
    cart: CartStore,
    feed: OrderMessageFeed,
) {
    loop {
        let identity = identities.borrow_and_update().clone();
        debug!(user_id = ?identity.as_ref().map(|i| i.id.as_str()), "Identity changed");
        tokio::join!(cart.load(identity.as_ref()), feed.set_identity(identity.as_ref()));
        if identities.changed().await.is_err() {
            break;
        }
    }
}
