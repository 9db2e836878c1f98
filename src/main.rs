//! # Storefront Demo
//!
//! Runs one customer through the storefront:
//! 1.  Seeding the catalog through the [`StoreSystem`].
//! 2.  Signing in and filling the cart.
//! 3.  Checking out, then advancing the order to `Delivered`.
//! 4.  Reading the rating prompt and rating the order.

use rust_decimal::Decimal;
use storefront_sync::config::StorefrontConfig;
use storefront_sync::lifecycle::{setup_tracing, StoreSystem, Storefront};
use storefront_sync::model::{Identity, MessageType, OrderStatus, ProductCreate};
use storefront_sync::order_placer::CheckoutSelections;
use storefront_sync::session::AuthSession;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = StorefrontConfig::from_env().map_err(|e| e.to_string())?;
    info!(delivery_fee = %config.delivery_fee, prefix = %config.order_prefix, "Starting storefront");

    let system = StoreSystem::new(&config);

    let span = tracing::info_span!("catalog_seed");
    async {
        let seed = [
            ProductCreate::new("Bibingka", Decimal::from(120), "Kakanin")
                .best_seller()
                .sort_order(1),
            ProductCreate::new("Puto Bumbong", Decimal::from(95), "Kakanin").sort_order(2),
            ProductCreate::new("Sapin-sapin", Decimal::from(80), "Kakanin")
                .tags(["Seasonal"])
                .sort_order(3),
        ];
        for product in seed {
            system
                .products
                .create_product(product)
                .await
                .map_err(|e| e.to_string())?;
        }
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    let session = AuthSession::new();
    let storefront = Storefront::new(system, &config, session.clone());

    session.sign_in(Identity::new("customer-1").with_full_name("Ana Santos"));
    storefront.sync_identity().await;

    let catalog = storefront.catalog.list_available().await;
    info!(products = catalog.len(), "Catalog loaded");

    let span = tracing::info_span!("shopping");
    async {
        for product in catalog.iter().take(2) {
            storefront
                .cart
                .add_to_cart(product)
                .await
                .map_err(|e| e.to_string())?;
        }
        if let Some(first) = catalog.first() {
            storefront
                .cart
                .add_to_cart(first)
                .await
                .map_err(|e| e.to_string())?;
        }
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    let cart = storefront.cart.snapshot();
    info!(items = cart.cart_count(), subtotal = %cart.subtotal(), "Cart ready");

    let selections = CheckoutSelections::delivery("Ana Santos", "0917 555 0101", "12 Mabini St, Quezon City");
    let placed = match storefront.checkout(&selections).await {
        Ok(placed) => placed,
        Err(e) => {
            error!(error = %e, "Checkout failed");
            storefront.shutdown().await.map_err(|e| e.to_string())?;
            return Err(e.to_string());
        }
    };
    info!(order_number = %placed.order_number, cart_after = storefront.cart.cart_count(), "Order placed");

    // Fulfillment side: the kitchen works through the order
    let span = tracing::info_span!("fulfillment", order_id = %placed.order_id);
    let delivered = async {
        let mut order = None;
        for status in [
            OrderStatus::Preparing,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ] {
            order = Some(
                storefront
                    .fulfillment
                    .advance(placed.order_id, status)
                    .await
                    .map_err(|e| e.to_string())?,
            );
        }
        Ok::<_, String>(order)
    }
    .instrument(span)
    .await?;

    storefront.feed.fetch().await;
    let inbox = storefront.feed.snapshot();
    info!(messages = inbox.messages.len(), unread = inbox.unread_count, "Inbox");
    if let Some(prompt) = inbox
        .messages
        .iter()
        .find(|m| m.message_type == MessageType::RatingPrompt)
    {
        info!(body = %prompt.body, "Rating prompt received");
    }

    if let Some(order) = delivered {
        let flow = storefront.rating_flow(&order);
        match flow.submit(5, Some("Still warm on arrival".to_string())).await {
            Ok(rated) => info!(rating = ?rated.rating, note = ?rated.rating_note, "Order rated"),
            Err(e) => error!(error = %e, "Rating failed"),
        }
    }

    let marked = storefront
        .feed
        .mark_all_read()
        .await
        .map_err(|e| e.to_string())?;
    info!(marked, unread = storefront.feed.unread_count(), "Inbox read");

    // Shutdown system gracefully
    storefront.shutdown().await.map_err(|e| e.to_string())?;

    info!("Application completed successfully");
    Ok(())
}
