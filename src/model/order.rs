use crate::model::{OrderId, ProductId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// An order created from a cart snapshot at checkout.
///
/// Everything except `status` and the rating fields is fixed at creation.
/// `lines` hold product name and unit price captured by value, so later
/// catalog changes never alter a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-facing number, e.g. `ORD-00042`. Assigned by the orders actor.
    pub order_number: String,
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_mode: DeliveryMode,
    pub delivery_address: Option<String>,
    pub delivery_location: Option<GeoPoint>,
    pub payment_method: PaymentMethod,
    pub scheduled_date: Option<NaiveDate>,
    pub lines: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub rated: bool,
    pub rating: Option<u8>,
    pub rating_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product line captured at placement time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryMode {
    Delivery,
    #[serde(rename = "Pick-up")]
    PickUp,
}

impl Display for DeliveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Delivery => "Delivery",
            Self::PickUp => "Pick-up",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "COD")]
    Cod,
    GCash,
    Maya,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Cod => "COD",
            Self::GCash => "GCash",
            Self::Maya => "Maya",
        })
    }
}

/// Fulfillment lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Preparing,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Preparing => "Preparing",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether an order in `mode` may move from `self` to `next`.
    ///
    /// Pick-up orders skip `Out for Delivery` and can never enter it.
    pub fn can_advance_to(&self, next: OrderStatus, mode: DeliveryMode) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Preparing) | (Pending, Cancelled) | (Preparing, Cancelled) => true,
            (Preparing, OutForDelivery) => mode == DeliveryMode::Delivery,
            (Preparing, Delivered) => mode == DeliveryMode::PickUp,
            (OutForDelivery, Delivered) => true,
            _ => false,
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Money summary of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Sums `price × quantity` over `lines` and adds `delivery_fee` in
    /// `Delivery` mode only. `None` when any step overflows `Decimal`.
    pub fn compute<I>(lines: I, mode: DeliveryMode, delivery_fee: Decimal) -> Option<Self>
    where
        I: IntoIterator<Item = (Decimal, u32)>,
    {
        let subtotal = lines
            .into_iter()
            .try_fold(Decimal::ZERO, |acc, (price, quantity)| {
                acc.checked_add(price.checked_mul(Decimal::from(quantity))?)
            })?;
        let delivery_fee = match mode {
            DeliveryMode::Delivery => delivery_fee,
            DeliveryMode::PickUp => Decimal::ZERO,
        };
        Some(Self {
            subtotal,
            delivery_fee,
            total: subtotal.checked_add(delivery_fee)?,
        })
    }
}

/// A customer rating in 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "Poor",
            2 => "Fair",
            3 => "Good",
            4 => "Very good",
            _ => "Excellent",
        }
    }
}

/// Payload for inserting an order. Totals are computed by the caller.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_mode: DeliveryMode,
    pub delivery_address: Option<String>,
    pub delivery_location: Option<GeoPoint>,
    pub payment_method: PaymentMethod,
    pub scheduled_date: Option<NaiveDate>,
    pub lines: Vec<OrderLine>,
    pub totals: OrderTotals,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderUpdate {
    /// Writes rating, note and `rated = true` together. Rejected once rated.
    Rate {
        rating: Rating,
        note: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Advance(OrderStatus),
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub user_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_apply_fee_only_for_delivery() {
        let lines = [(Decimal::from(100), 2), (Decimal::from(50), 1)];

        let delivery =
            OrderTotals::compute(lines, DeliveryMode::Delivery, Decimal::from(50)).unwrap();
        assert_eq!(delivery.subtotal, Decimal::from(250));
        assert_eq!(delivery.total, Decimal::from(300));

        let pickup = OrderTotals::compute(lines, DeliveryMode::PickUp, Decimal::from(50)).unwrap();
        assert_eq!(pickup.delivery_fee, Decimal::ZERO);
        assert_eq!(pickup.total, Decimal::from(250));
    }

    #[test]
    fn test_totals_overflow_is_none() {
        let huge = Decimal::from_str_exact("70000000000000000000000000000").unwrap();
        assert!(OrderTotals::compute([(huge, 10)], DeliveryMode::PickUp, Decimal::ZERO).is_none());
        assert!(
            OrderTotals::compute([(huge, 1), (huge, 1)], DeliveryMode::PickUp, Decimal::ZERO)
                .is_none()
        );
        assert!(OrderTotals::compute([(Decimal::MAX, 1)], DeliveryMode::Delivery, Decimal::ONE)
            .is_none());
        assert!(OrderTotals::compute([(Decimal::MAX, 1)], DeliveryMode::PickUp, Decimal::ONE)
            .is_some());
    }

    #[test]
    fn test_status_transitions_depend_on_mode() {
        use OrderStatus::*;
        assert!(Pending.can_advance_to(Preparing, DeliveryMode::Delivery));
        assert!(Preparing.can_advance_to(OutForDelivery, DeliveryMode::Delivery));
        assert!(!Preparing.can_advance_to(Delivered, DeliveryMode::Delivery));
        assert!(Preparing.can_advance_to(Delivered, DeliveryMode::PickUp));
        assert!(!Preparing.can_advance_to(OutForDelivery, DeliveryMode::PickUp));
        assert!(!Delivered.can_advance_to(Cancelled, DeliveryMode::PickUp));
        assert!(!Pending.can_advance_to(Delivered, DeliveryMode::PickUp));
    }

    #[test]
    fn test_rating_bounds_and_labels() {
        assert!(Rating::new(0).is_none());
        assert!(Rating::new(6).is_none());
        assert_eq!(Rating::new(1).map(|r| r.label()), Some("Poor"));
        assert_eq!(Rating::new(4).map(|r| r.label()), Some("Very good"));
        assert_eq!(Rating::new(5).map(|r| r.label()), Some("Excellent"));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).unwrap(),
            "\"Out for Delivery\""
        );
        assert_eq!(serde_json::to_string(&DeliveryMode::PickUp).unwrap(), "\"Pick-up\"");
        assert_eq!(serde_json::to_string(&PaymentMethod::Cod).unwrap(), "\"COD\"");
    }
}
