use chrono::Utc;
use rust_decimal::Decimal;
use storefront_sync::cart_store::{CartError, CartStore, LineRef};
use storefront_sync::clients::{CartClient, CartLineClient, ProductClient, StoreError};
use storefront_sync::config::StorefrontConfig;
use storefront_sync::framework::mock::{create_mock_client, MockClient};
use storefront_sync::framework::{FrameworkError, ResourceRequest};
use storefront_sync::lifecycle::StoreSystem;
use storefront_sync::model::{
    Cart, CartId, CartLine, CartLineId, Identity, Product, ProductCreate, ProductId, UserId,
};

async fn seeded_system() -> (StoreSystem, Vec<Product>) {
    let system = StoreSystem::new(&StorefrontConfig::default());
    for (name, price) in [("Bibingka", 120), ("Puto", 50), ("Kutsinta", 60)] {
        system
            .products
            .create_product(ProductCreate::new(name, Decimal::from(price), "Kakanin"))
            .await
            .expect("Failed to create product");
    }
    let products = system
        .products
        .list_available()
        .await
        .expect("Failed to list products");
    (system, products)
}

fn cart_store(system: &StoreSystem) -> CartStore {
    CartStore::new(
        system.products.clone(),
        system.carts.clone(),
        system.cart_lines.clone(),
        "/placeholder.png",
    )
}

fn product(id: u32, price: i64) -> Product {
    Product {
        id: ProductId(id),
        name: format!("Product {id}"),
        description: None,
        price: Decimal::from(price),
        image_url: None,
        category: "Kakanin".into(),
        is_best_seller: false,
        is_available: true,
        tags: vec![],
        sort_order: 0,
    }
}

fn cart(id: u32, user: &str) -> Cart {
    let now = Utc::now();
    Cart {
        id: CartId(id),
        user_id: UserId::from(user),
        created_at: now,
        updated_at: now,
    }
}

fn line(id: u32, cart_id: u32, product_id: u32, quantity: u32) -> CartLine {
    let now = Utc::now();
    CartLine {
        id: CartLineId(id),
        cart_id: CartId(cart_id),
        product_id: ProductId(product_id),
        quantity,
        created_at: now,
        updated_at: now,
    }
}

fn assert_consistent(store: &CartStore) {
    let snapshot = store.snapshot();
    let sum: u32 = snapshot.lines.iter().map(|l| l.quantity).sum();
    assert_eq!(store.cart_count(), sum);
    assert_eq!(snapshot.cart_count(), sum);
    assert!(snapshot.lines.iter().all(|l| l.quantity > 0));
}

/// Adding the same product twice increments one line, both in memory and in
/// the store.
#[tokio::test]
async fn test_same_product_twice_gives_one_line() {
    let (system, products) = seeded_system().await;
    let store = cart_store(&system);
    store.load(Some(&Identity::new("alice"))).await;

    store.add_to_cart(&products[0]).await.expect("first add");
    store.add_to_cart(&products[0]).await.expect("second add");

    let snapshot = store.snapshot();
    assert_eq!(snapshot.lines.len(), 1);
    assert_eq!(snapshot.lines[0].quantity, 2);
    assert!(matches!(snapshot.lines[0].line, LineRef::Persisted(_)));
    assert_eq!(store.cart_count(), 2);
    assert_eq!(snapshot.subtotal(), Decimal::from(240));

    let cart_id = snapshot.cart_id.expect("cart resolved");
    let rows = system.cart_lines.list_for_cart(cart_id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 2);

    drop(store);
    system.shutdown().await.unwrap();
}

/// Removing a line twice is the same as removing it once.
#[tokio::test]
async fn test_removing_a_line_is_idempotent() {
    let (system, products) = seeded_system().await;
    let store = cart_store(&system);
    store.load(Some(&Identity::new("bob"))).await;
    store.add_to_cart(&products[1]).await.unwrap();
    store.add_to_cart(&products[1]).await.unwrap();
    store.add_to_cart(&products[2]).await.unwrap();

    let target = store.snapshot().lines[0].clone();
    assert_eq!(target.product_id, products[1].id);

    store
        .update_quantity(target.line, -(target.quantity as i32))
        .await
        .expect("first removal");
    let once = store.snapshot();
    store
        .update_quantity(target.line, -(target.quantity as i32))
        .await
        .expect("second removal");

    assert_eq!(store.snapshot(), once);
    assert_eq!(once.lines.len(), 1);
    let rows = system
        .cart_lines
        .list_for_cart(once.cart_id.unwrap())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].product_id, products[2].id);

    drop(store);
    system.shutdown().await.unwrap();
}

/// Negative results clamp to zero and remove the line.
#[tokio::test]
async fn test_large_negative_delta_removes_line() {
    let (system, products) = seeded_system().await;
    let store = cart_store(&system);
    store.load(Some(&Identity::new("carol"))).await;
    store.add_to_cart(&products[0]).await.unwrap();

    let line = store.snapshot().lines[0].line;
    store.update_quantity(line, 3).await.unwrap();
    assert_eq!(store.cart_count(), 4);
    store.update_quantity(line, -10).await.unwrap();

    assert!(store.snapshot().is_empty());
    assert_eq!(store.cart_count(), 0);

    drop(store);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invariants_hold_through_a_mixed_sequence() {
    let (system, products) = seeded_system().await;
    let store = cart_store(&system);
    store.load(Some(&Identity::new("dan"))).await;

    for step in 0..12usize {
        let product = &products[step % products.len()];
        store.add_to_cart(product).await.unwrap();
        assert_consistent(&store);

        let lines = store.snapshot().lines;
        let target = &lines[step % lines.len()];
        let delta = [-1, 2, -3][step % 3];
        store.update_quantity(target.line, delta).await.unwrap();
        assert_consistent(&store);
    }

    // The durable rows agree with memory after a fresh load
    let memory = store.snapshot();
    store.load(Some(&Identity::new("dan"))).await;
    let reloaded = store.snapshot();
    let quantities = |lines: &[storefront_sync::cart_store::CartItemView]| {
        let mut q: Vec<(ProductId, u32)> = lines.iter().map(|l| (l.product_id, l.quantity)).collect();
        q.sort();
        q
    };
    assert_eq!(quantities(&memory.lines), quantities(&reloaded.lines));

    drop(store);
    system.shutdown().await.unwrap();
}

/// The cart survives across store instances for the same identity.
#[tokio::test]
async fn test_cart_is_shared_across_sessions() {
    let (system, products) = seeded_system().await;
    let phone = cart_store(&system);
    phone.load(Some(&Identity::new("erin"))).await;
    phone.add_to_cart(&products[2]).await.unwrap();

    let laptop = cart_store(&system);
    laptop.load(Some(&Identity::new("erin"))).await;

    assert_eq!(laptop.snapshot().cart_id, phone.snapshot().cart_id);
    assert_eq!(laptop.cart_count(), 1);
    assert_eq!(laptop.snapshot().lines[0].name, products[2].name);

    drop(phone);
    drop(laptop);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_no_identity_resets_and_refuses_writes() {
    let (system, products) = seeded_system().await;
    let store = cart_store(&system);
    store.load(Some(&Identity::new("fay"))).await;
    store.add_to_cart(&products[0]).await.unwrap();

    store.load(None).await;
    let snapshot = store.snapshot();
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.cart_id, None);
    assert!(!snapshot.loading);

    assert_eq!(store.add_to_cart(&products[0]).await, Err(CartError::NotReady));
    // Without a cart id clearing is a no-op
    assert_eq!(store.clear_cart().await, Ok(()));

    drop(store);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_clear_cart_empties_memory_and_store() {
    let (system, products) = seeded_system().await;
    let store = cart_store(&system);
    store.load(Some(&Identity::new("gil"))).await;
    for product in &products {
        store.add_to_cart(product).await.unwrap();
    }
    let cart_id = store.snapshot().cart_id.unwrap();

    store.clear_cart().await.unwrap();

    assert!(store.snapshot().is_empty());
    assert!(system.cart_lines.list_for_cart(cart_id).await.unwrap().is_empty());

    drop(store);
    system.shutdown().await.unwrap();
}

/// A failed insert takes back its optimistic line.
#[tokio::test]
async fn test_failed_add_is_reverted() {
    let products = MockClient::<Product>::new();
    let mut carts = MockClient::<Cart>::new();
    let mut lines = MockClient::<CartLine>::new();
    carts.expect_upsert().return_ok(cart(1, "hana"));
    lines.expect_list().return_ok(vec![]);
    lines.expect_upsert().return_err(FrameworkError::ActorClosed);

    let store = CartStore::new(
        ProductClient::new(products.client()),
        CartClient::new(carts.client()),
        CartLineClient::new(lines.client()),
        "/placeholder.png",
    );
    store.load(Some(&Identity::new("hana"))).await;

    let result = store.add_to_cart(&product(1, 100)).await;

    assert!(matches!(
        result,
        Err(CartError::Transaction(StoreError::Unavailable(_)))
    ));
    assert!(store.snapshot().is_empty());
    assert_eq!(store.cart_count(), 0);
    products.verify();
    carts.verify();
    lines.verify();
}

/// Failed quantity writes restore the previous quantity, including a line
/// that had been removed.
#[tokio::test]
async fn test_failed_quantity_changes_are_reverted() {
    let mut products = MockClient::<Product>::new();
    let mut carts = MockClient::<Cart>::new();
    let mut lines = MockClient::<CartLine>::new();
    carts.expect_upsert().return_ok(cart(1, "ivan"));
    lines.expect_list().return_ok(vec![line(5, 1, 1, 2)]);
    products.expect_list().return_ok(vec![product(1, 100)]);
    lines
        .expect_delete(CartLineId(5))
        .return_err(FrameworkError::ActorDropped);
    lines
        .expect_update(CartLineId(5))
        .return_err(FrameworkError::ActorDropped);

    let store = CartStore::new(
        ProductClient::new(products.client()),
        CartClient::new(carts.client()),
        CartLineClient::new(lines.client()),
        "/placeholder.png",
    );
    store.load(Some(&Identity::new("ivan"))).await;
    let persisted = LineRef::Persisted(CartLineId(5));
    assert_eq!(store.cart_count(), 2);

    assert!(store.update_quantity(persisted, -2).await.is_err());
    assert_eq!(store.snapshot().lines.len(), 1);
    assert_eq!(store.cart_count(), 2);

    assert!(store.update_quantity(persisted, 1).await.is_err());
    assert_eq!(store.cart_count(), 2);

    products.verify();
    carts.verify();
    lines.verify();
}

/// A failed clear puts the lines back.
#[tokio::test]
async fn test_failed_clear_restores_lines() {
    let mut products = MockClient::<Product>::new();
    let mut carts = MockClient::<Cart>::new();
    let mut lines = MockClient::<CartLine>::new();
    carts.expect_upsert().return_ok(cart(1, "nia"));
    lines
        .expect_list()
        .return_ok(vec![line(5, 1, 1, 2), line(6, 1, 2, 1)]);
    products
        .expect_list()
        .return_ok(vec![product(1, 100), product(2, 50)]);
    lines
        .expect_delete_where()
        .return_err(FrameworkError::ActorClosed);

    let store = CartStore::new(
        ProductClient::new(products.client()),
        CartClient::new(carts.client()),
        CartLineClient::new(lines.client()),
        "/placeholder.png",
    );
    store.load(Some(&Identity::new("nia"))).await;
    assert_eq!(store.cart_count(), 3);

    let result = store.clear_cart().await;

    assert!(matches!(
        result,
        Err(CartError::Transaction(StoreError::Unavailable(_)))
    ));
    assert_eq!(store.snapshot().lines.len(), 2);
    assert_eq!(store.cart_count(), 3);
    products.verify();
    carts.verify();
    lines.verify();
}

/// The optimistic line is visible while the write is still in flight, and
/// the reload swaps its temporary reference for the row id.
#[tokio::test]
async fn test_optimistic_line_visible_before_confirmation() {
    let mut products = MockClient::<Product>::new();
    let mut carts = MockClient::<Cart>::new();
    carts.expect_upsert().return_ok(cart(1, "jo"));
    carts.expect_upsert().return_ok(cart(1, "jo"));
    products.expect_list().return_ok(vec![product(3, 80)]);
    let (line_client, mut requests) = create_mock_client::<CartLine>(8);

    let store = CartStore::new(
        ProductClient::new(products.client()),
        CartClient::new(carts.client()),
        CartLineClient::new(line_client),
        "/placeholder.png",
    );

    let loading = tokio::spawn({
        let store = store.clone();
        async move { store.load(Some(&Identity::new("jo"))).await }
    });
    match requests.recv().await {
        Some(ResourceRequest::List { respond_to, .. }) => respond_to.send(Ok(vec![])).unwrap(),
        other => panic!("expected list, got {:?}", other.map(|r| r.kind())),
    }
    loading.await.unwrap();

    let adding = tokio::spawn({
        let store = store.clone();
        async move { store.add_to_cart(&product(3, 80)).await }
    });
    let respond_to = match requests.recv().await {
        Some(ResourceRequest::Upsert { respond_to, .. }) => respond_to,
        other => panic!("expected upsert, got {:?}", other.map(|r| r.kind())),
    };

    let pending = store.snapshot();
    assert_eq!(pending.lines.len(), 1);
    assert_eq!(pending.lines[0].line, LineRef::Pending(ProductId(3)));
    assert_eq!(pending.lines[0].line.to_string(), "temp-3");
    assert_eq!(pending.cart_count(), 1);

    respond_to.send(Ok(line(9, 1, 3, 1))).unwrap();
    match requests.recv().await {
        Some(ResourceRequest::List { respond_to, .. }) => {
            respond_to.send(Ok(vec![line(9, 1, 3, 1)])).unwrap()
        }
        other => panic!("expected list, got {:?}", other.map(|r| r.kind())),
    }
    adding.await.unwrap().unwrap();

    let confirmed = store.snapshot();
    assert_eq!(confirmed.lines[0].line, LineRef::Persisted(CartLineId(9)));
    assert_eq!(confirmed.cart_count(), 1);
    products.verify();
    carts.verify();
}

/// A load that finishes after a newer one is discarded.
#[tokio::test]
async fn test_stale_load_does_not_overwrite_newer_identity() {
    let mut products = MockClient::<Product>::new();
    let mut carts = MockClient::<Cart>::new();
    carts.expect_upsert().return_ok(cart(1, "kai"));
    carts.expect_upsert().return_ok(cart(2, "lea"));
    products.expect_list().return_ok(vec![product(1, 100)]);
    let (line_client, mut requests) = create_mock_client::<CartLine>(8);

    let store = CartStore::new(
        ProductClient::new(products.client()),
        CartClient::new(carts.client()),
        CartLineClient::new(line_client),
        "/placeholder.png",
    );

    let first = tokio::spawn({
        let store = store.clone();
        async move { store.load(Some(&Identity::new("kai"))).await }
    });
    let stale_reply = match requests.recv().await {
        Some(ResourceRequest::List { respond_to, .. }) => respond_to,
        other => panic!("expected list, got {:?}", other.map(|r| r.kind())),
    };

    let second = tokio::spawn({
        let store = store.clone();
        async move { store.load(Some(&Identity::new("lea"))).await }
    });
    match requests.recv().await {
        Some(ResourceRequest::List { respond_to, .. }) => respond_to.send(Ok(vec![])).unwrap(),
        other => panic!("expected list, got {:?}", other.map(|r| r.kind())),
    }
    second.await.unwrap();

    stale_reply.send(Ok(vec![line(1, 1, 1, 4)])).unwrap();
    first.await.unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.user_id, Some(UserId::from("lea")));
    assert_eq!(snapshot.cart_id, Some(CartId(2)));
    assert!(snapshot.is_empty());
    assert!(!snapshot.loading);
    products.verify();
    carts.verify();
}

/// Read failures show an empty cart instead of an error.
#[tokio::test]
async fn test_read_failure_falls_back_to_empty() {
    let products = MockClient::<Product>::new();
    let mut carts = MockClient::<Cart>::new();
    let lines = MockClient::<CartLine>::new();
    carts.expect_upsert().return_err(FrameworkError::ActorClosed);

    let store = CartStore::new(
        ProductClient::new(products.client()),
        CartClient::new(carts.client()),
        CartLineClient::new(lines.client()),
        "/placeholder.png",
    );
    store.load(Some(&Identity::new("max"))).await;

    let snapshot = store.snapshot();
    assert!(snapshot.is_empty());
    assert!(!snapshot.loading);
    assert_eq!(snapshot.cart_id, None);
    carts.verify();
    lines.verify();
}
