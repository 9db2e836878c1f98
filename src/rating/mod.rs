//! # Rating Flow
//!
//! `Unrated → Submitting → Rated` for one order. Only one submission may be in
//! flight per flow, and the orders table independently refuses a second
//! rating, so two flows racing on the same order still store one rating.

pub mod error;

pub use error::RatingError;

use crate::clients::{OrderClient, StoreError};
use crate::model::{Order, OrderId, OrderStatus, Rating, RecordError};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingState {
    Unrated,
    Submitting,
    Rated,
}

/// Rating submission for one order. Clones share state.
#[derive(Clone)]
pub struct RatingFlow {
    orders: OrderClient,
    order_id: OrderId,
    state: Arc<Mutex<RatingState>>,
}

impl RatingFlow {
    pub fn new(orders: OrderClient, order_id: OrderId) -> Self {
        Self {
            orders,
            order_id,
            state: Arc::new(Mutex::new(RatingState::Unrated)),
        }
    }

    /// Starts in `Rated` when the order already carries a rating.
    pub fn for_order(orders: OrderClient, order: &Order) -> Self {
        let flow = Self::new(orders, order.id);
        if order.rated {
            *flow.state.lock() = RatingState::Rated;
        }
        flow
    }

    /// Whether the storefront should prompt for a rating.
    pub fn should_prompt(order: &Order) -> bool {
        order.status == OrderStatus::Delivered && !order.rated
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn state(&self) -> RatingState {
        *self.state.lock()
    }

    /// Stores `value` and the optional note.
    ///
    /// The value is checked before anything is sent. A failed write, or a
    /// submit dropped before the store answered, returns the flow to
    /// `Unrated` so the caller may retry.
    #[instrument(skip(self, note), fields(order_id = %self.order_id))]
    pub async fn submit(&self, value: u8, note: Option<String>) -> Result<Order, RatingError> {
        if self.order_id.0 == 0 {
            return Err(RatingError::Validation("Order id is required".to_string()));
        }
        let rating = Rating::new(value).ok_or_else(|| {
            RatingError::Validation(format!(
                "Rating must be between {} and {}, got {value}",
                Rating::MIN,
                Rating::MAX
            ))
        })?;

        let mut pending = {
            let mut state = self.state.lock();
            match *state {
                RatingState::Submitting => return Err(RatingError::InFlight),
                RatingState::Rated => return Err(RatingError::AlreadyRated(self.order_id)),
                RatingState::Unrated => *state = RatingState::Submitting,
            }
            PendingSubmit {
                state: &self.state,
                rated: false,
            }
        };

        match self.orders.rate(self.order_id, rating, note).await {
            Ok(order) => {
                pending.rated = true;
                info!(rating = rating.value(), label = rating.label(), "Order rated");
                Ok(order)
            }
            Err(StoreError::Record(RecordError::AlreadyRated(id))) => {
                pending.rated = true;
                warn!("Order was already rated");
                Err(RatingError::AlreadyRated(id))
            }
            Err(e) => {
                warn!(error = %e, "Rating failed");
                Err(RatingError::Transaction(e))
            }
        }
    }
}

/// Settles a `Submitting` flow when `submit` returns or is dropped: `Rated`
/// once the store holds a rating, `Unrated` otherwise.
struct PendingSubmit<'a> {
    state: &'a Mutex<RatingState>,
    rated: bool,
}

impl Drop for PendingSubmit<'_> {
    fn drop(&mut self) {
        *self.state.lock() = if self.rated {
            RatingState::Rated
        } else {
            RatingState::Unrated
        };
    }
}
