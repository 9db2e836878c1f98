//! # Cart Store
//!
//! The in-memory copy of "my cart", mirrored to the `carts` and `cart_items`
//! tables.
//!
//! ## Optimistic writes
//!
//! Every mutator has two phases. The synchronous phase changes the in-memory
//! lines and publishes a snapshot before anything is awaited, so observers see
//! the change at once. The asynchronous phase performs the durable write. If
//! that write fails, the mutator applies the inverse of its own change and
//! returns [`CartError::Transaction`]; nothing is retried.
//!
//! `add_to_cart` finishes with a full reload, which replaces temporary line
//! references with row ids and adopts the stored quantities
//! (last-reload-wins).
//!
//! ## Sequencing
//!
//! Loads and optimistic changes take increasing tickets. A load result is
//! applied only if nothing with a higher ticket has been applied yet, so a
//! slow read never overwrites newer state while the caller of the newest read
//! always sees its result (or a newer one). Optimistic changes and identity
//! switches count as applied the moment they happen, which drops every read
//! that was started before them.
//!
//! ## Reads
//!
//! Read failures are logged and leave an empty cart. Callers only ever observe
//! "currently empty".

pub mod error;
pub mod view;

pub use error::CartError;
pub use view::{CartItemView, CartSnapshot, LineRef};

use crate::clients::{CartClient, CartLineClient, ProductClient, StoreError};
use crate::model::{CartId, Identity, Product, ProductId, UserId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct CartState {
    user_id: Option<UserId>,
    cart_id: Option<CartId>,
    lines: Vec<CartItemView>,
    /// Ticket of the newest load in flight, if any.
    loading: Option<u64>,
    /// Latest ticket handed out.
    ticket: u64,
    /// Ticket of the newest state applied. Older load results are stale.
    applied: u64,
}

impl CartState {
    fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            user_id: self.user_id.clone(),
            cart_id: self.cart_id,
            lines: self.lines.clone(),
            loading: self.loading.is_some(),
        }
    }

    fn next_ticket(&mut self) -> u64 {
        self.ticket += 1;
        self.ticket
    }

    /// Marks the in-memory state as newer than every read in flight.
    fn supersede(&mut self) {
        self.applied = self.next_ticket();
    }

    /// Settles the load `ticket`. Returns whether its result may be applied.
    fn finish_load(&mut self, ticket: u64) -> bool {
        if self.loading.is_some_and(|newest| newest <= ticket) {
            self.loading = None;
        }
        if ticket <= self.applied {
            return false;
        }
        self.applied = ticket;
        true
    }

    fn owns(&self, user_id: &UserId, cart_id: CartId) -> bool {
        self.user_id.as_ref() == Some(user_id) && self.cart_id == Some(cart_id)
    }

    fn position(&self, line: &LineRef) -> Option<usize> {
        self.lines.iter().position(|item| &item.line == line)
    }

    /// Adds `delta` to the line, dropping it if the result is not positive.
    fn apply_delta(&mut self, index: usize, delta: i64) {
        let next = i64::from(self.lines[index].quantity) + delta;
        if next <= 0 {
            self.lines.remove(index);
        } else {
            self.lines[index].quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
    }
}

/// The optimistic change `update_quantity` made, kept for the durable write
/// and for reverting it.
enum QuantityChange {
    Removed {
        index: usize,
        item: CartItemView,
    },
    Set {
        line: LineRef,
        product_id: ProductId,
        previous: u32,
        next: u32,
    },
}

struct Inner {
    products: ProductClient,
    carts: CartClient,
    lines: CartLineClient,
    placeholder_image: String,
    state: Mutex<CartState>,
    snapshots: watch::Sender<CartSnapshot>,
}

/// Handle to the cart. Clones share state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl CartStore {
    pub fn new(
        products: ProductClient,
        carts: CartClient,
        lines: CartLineClient,
        placeholder_image: impl Into<String>,
    ) -> Self {
        let (snapshots, _) = watch::channel(CartSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                products,
                carts,
                lines,
                placeholder_image: placeholder_image.into(),
                state: Mutex::new(CartState::default()),
                snapshots,
            }),
        }
    }

    /// Applies `f` to the state and publishes the resulting snapshot.
    fn update<R>(&self, f: impl FnOnce(&mut CartState) -> R) -> R {
        let mut state = self.inner.state.lock();
        let result = f(&mut state);
        self.inner.snapshots.send_replace(state.snapshot());
        result
    }

    pub fn snapshot(&self) -> CartSnapshot {
        self.inner.state.lock().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// Sum of all line quantities.
    pub fn cart_count(&self) -> u32 {
        view::count_lines(&self.inner.state.lock().lines)
    }

    /// The current lines, captured by value for checkout.
    pub fn checkout_lines(&self) -> Vec<CartItemView> {
        self.inner.state.lock().lines.clone()
    }

    /// Loads the identity's cart, or resets to an empty, unassociated cart
    /// when there is no identity (no store access in that case).
    pub async fn load(&self, identity: Option<&Identity>) {
        match identity {
            Some(identity) => self.load_user(identity.id.clone(), false).await,
            None => self.update(|s| {
                s.supersede();
                s.user_id = None;
                s.cart_id = None;
                s.lines.clear();
                s.loading = None;
                debug!("Cart reset, no identity");
            }),
        }
    }

    /// Fetch-or-create the cart, then read its lines joined with products.
    ///
    /// With `refresh_only` the load is skipped unless `user_id` is still the
    /// current identity.
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn load_user(&self, user_id: UserId, refresh_only: bool) {
        let started = self.update(|s| {
            if s.user_id.as_ref() != Some(&user_id) {
                if refresh_only {
                    return None;
                }
                s.supersede();
                s.user_id = Some(user_id.clone());
                s.cart_id = None;
                s.lines.clear();
            }
            let ticket = s.next_ticket();
            s.loading = Some(ticket);
            Some(ticket)
        });
        let Some(ticket) = started else {
            debug!("Identity changed, refresh skipped");
            return;
        };

        let (cart_id, lines) = match self.inner.carts.upsert_for(&user_id).await {
            Ok(cart) => (Some(cart.id), self.fetch_lines(cart.id).await),
            Err(e) => (None, Err(e)),
        };

        self.update(|s| {
            if !s.finish_load(ticket) {
                debug!(ticket, applied = s.applied, "Stale cart load dropped");
                return;
            }
            s.cart_id = cart_id;
            s.lines = lines.unwrap_or_else(|e| {
                warn!(error = %e, "Cart read failed, showing empty cart");
                Vec::new()
            });
            info!(cart_id = ?cart_id, lines = s.lines.len(), "Cart loaded");
        });
    }

    async fn fetch_lines(&self, cart_id: CartId) -> Result<Vec<CartItemView>, StoreError> {
        let lines = self.inner.lines.list_for_cart(cart_id).await?;
        if lines.is_empty() {
            return Ok(Vec::new());
        }
        let ids = lines.iter().map(|line| line.product_id).collect();
        let products: HashMap<ProductId, Product> = self
            .inner
            .products
            .list_by_ids(ids)
            .await?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        Ok(lines
            .into_iter()
            .filter_map(|line| match products.get(&line.product_id) {
                Some(product) => Some(CartItemView::new(
                    LineRef::Persisted(line.id),
                    product,
                    line.quantity,
                    &self.inner.placeholder_image,
                )),
                None => {
                    debug!(product_id = %line.product_id, "Cart line without product skipped");
                    None
                }
            })
            .collect())
    }

    /// Adds one unit of `product`, then reloads.
    ///
    /// Requires a signed-in identity with a resolved cart.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_to_cart(&self, product: &Product) -> Result<(), CartError> {
        let placeholder = &self.inner.placeholder_image;
        let (user_id, cart_id) = self.update(|s| {
            let (Some(user_id), Some(cart_id)) = (s.user_id.clone(), s.cart_id) else {
                return Err(CartError::NotReady);
            };
            s.supersede();
            match s.lines.iter_mut().find(|l| l.product_id == product.id) {
                Some(line) => line.quantity = line.quantity.saturating_add(1),
                None => s.lines.push(CartItemView::new(
                    LineRef::Pending(product.id),
                    product,
                    1,
                    placeholder,
                )),
            }
            Ok((user_id, cart_id))
        })?;

        match self
            .inner
            .lines
            .increment_or_insert(cart_id, product.id, 1)
            .await
        {
            Ok(line) => {
                debug!(line_id = %line.id, quantity = line.quantity, "Line stored");
                self.load_user(user_id, true).await;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Add failed, reverting");
                self.update(|s| {
                    if !s.owns(&user_id, cart_id) {
                        return;
                    }
                    if let Some(index) = s.lines.iter().position(|l| l.product_id == product.id) {
                        s.apply_delta(index, -1);
                    }
                });
                Err(CartError::Transaction(e))
            }
        }
    }

    /// Changes a line's quantity by `delta`, clamping at zero. A line that
    /// reaches zero is removed. Unknown lines are a no-op.
    #[instrument(skip(self), fields(line = %line))]
    pub async fn update_quantity(&self, line: LineRef, delta: i32) -> Result<(), CartError> {
        let planned = self.update(|s| {
            let Some(index) = s.position(&line) else {
                return Ok(None);
            };
            let (Some(user_id), Some(cart_id)) = (s.user_id.clone(), s.cart_id) else {
                return Err(CartError::NotReady);
            };
            s.supersede();
            let previous = s.lines[index].quantity;
            let next = u32::try_from((i64::from(previous) + i64::from(delta)).max(0))
                .unwrap_or(u32::MAX);
            let change = if next == 0 {
                QuantityChange::Removed {
                    index,
                    item: s.lines.remove(index),
                }
            } else {
                s.lines[index].quantity = next;
                QuantityChange::Set {
                    line,
                    product_id: s.lines[index].product_id,
                    previous,
                    next,
                }
            };
            Ok(Some((user_id, cart_id, change)))
        })?;
        let Some((user_id, cart_id, change)) = planned else {
            debug!("Line not in cart");
            return Ok(());
        };

        let written = match &change {
            QuantityChange::Removed { item, .. } => match item.line {
                LineRef::Persisted(id) => self.inner.lines.remove(id).await,
                LineRef::Pending(product_id) => self
                    .inner
                    .lines
                    .remove_product(cart_id, product_id)
                    .await
                    .map(|_| ()),
            },
            QuantityChange::Set {
                line,
                product_id,
                next,
                ..
            } => match line {
                LineRef::Persisted(id) => self.inner.lines.set_quantity(*id, *next).await.map(|_| ()),
                LineRef::Pending(_) => self
                    .inner
                    .lines
                    .set_quantity_for(cart_id, *product_id, *next)
                    .await
                    .map(|_| ()),
            },
        };

        if let Err(e) = written {
            warn!(error = %e, "Quantity write failed, reverting");
            self.update(|s| {
                if !s.owns(&user_id, cart_id) {
                    return;
                }
                match change {
                    QuantityChange::Removed { index, item } => {
                        if s.lines.iter().all(|l| l.product_id != item.product_id) {
                            let index = index.min(s.lines.len());
                            s.lines.insert(index, item);
                        }
                    }
                    QuantityChange::Set {
                        line,
                        previous,
                        next,
                        ..
                    } => {
                        if let Some(index) = s.position(&line) {
                            s.apply_delta(index, i64::from(previous) - i64::from(next));
                        }
                    }
                }
            });
            return Err(CartError::Transaction(e));
        }
        Ok(())
    }

    /// Empties the cart and deletes its rows. No-op without a known cart.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<(), CartError> {
        let cleared = self.update(|s| {
            let user_id = s.user_id.clone()?;
            let cart_id = s.cart_id?;
            s.supersede();
            Some((user_id, cart_id, std::mem::take(&mut s.lines)))
        });
        let Some((user_id, cart_id, previous)) = cleared else {
            debug!("No cart to clear");
            return Ok(());
        };

        match self.inner.lines.clear(cart_id).await {
            Ok(removed) => {
                info!(cart_id = %cart_id, removed, "Cart cleared");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Clear failed, restoring lines");
                self.update(|s| {
                    if !s.owns(&user_id, cart_id) {
                        return;
                    }
                    let mut restored: Vec<CartItemView> = previous
                        .into_iter()
                        .filter(|item| s.lines.iter().all(|l| l.product_id != item.product_id))
                        .collect();
                    restored.append(&mut s.lines);
                    s.lines = restored;
                });
                Err(CartError::Transaction(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(line: LineRef, quantity: u32) -> CartItemView {
        let product = Product {
            id: ProductId(1),
            name: "Puto".into(),
            description: None,
            price: rust_decimal::Decimal::from(10),
            image_url: None,
            category: "Kakanin".into(),
            is_best_seller: false,
            is_available: true,
            tags: vec![],
            sort_order: 0,
        };
        CartItemView::new(line, &product, quantity, "/placeholder.png")
    }

    #[test]
    fn test_apply_delta_removes_at_zero() {
        let mut state = CartState {
            lines: vec![item(LineRef::Pending(ProductId(1)), 2)],
            ..CartState::default()
        };
        state.apply_delta(0, -1);
        assert_eq!(state.lines[0].quantity, 1);
        state.apply_delta(0, -5);
        assert!(state.lines.is_empty());
    }

    #[test]
    fn test_reads_older_than_applied_state_are_stale() {
        let mut state = CartState::default();
        let slow = state.next_ticket();
        state.loading = Some(slow);
        let fast = state.next_ticket();
        state.loading = Some(fast);

        assert!(state.finish_load(fast));
        assert!(state.loading.is_none());
        assert!(!state.finish_load(slow));

        let before_edit = state.next_ticket();
        state.supersede();
        assert!(!state.finish_load(before_edit));
    }

    #[test]
    fn test_count_and_subtotal_saturate() {
        let snapshot = CartSnapshot {
            lines: vec![
                item(LineRef::Pending(ProductId(1)), u32::MAX),
                item(LineRef::Pending(ProductId(2)), u32::MAX),
            ],
            ..CartSnapshot::default()
        };
        assert_eq!(snapshot.cart_count(), u32::MAX);
        assert_eq!(snapshot.subtotal(), rust_decimal::Decimal::from(10u64 * 2 * u32::MAX as u64));

        let mut pricey = item(LineRef::Pending(ProductId(3)), u32::MAX);
        pricey.price = rust_decimal::Decimal::MAX;
        let snapshot = CartSnapshot {
            lines: vec![pricey],
            ..CartSnapshot::default()
        };
        assert_eq!(snapshot.subtotal(), rust_decimal::Decimal::MAX);
    }

    #[test]
    fn test_pending_line_ref_uses_temp_prefix() {
        assert_eq!(LineRef::Pending(ProductId(9)).to_string(), "temp-9");
        assert_eq!(item(LineRef::Pending(ProductId(1)), 1).image_url, "/placeholder.png");
    }
}
