//! The placement request as it travels to the endpoint, and the rules every
//! submission must satisfy.

use crate::cart_store::CartItemView;
use crate::model::{DeliveryMode, GeoPoint, OrderTotals, PaymentMethod, ProductId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One submitted line. Name and price are captured at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderPayload {
    pub cart_items: Vec<PlaceOrderLine>,
    pub delivery_mode: DeliveryMode,
    pub delivery_address: Option<String>,
    pub delivery_lat: Option<f64>,
    pub delivery_lng: Option<f64>,
    pub payment_method: PaymentMethod,
    pub scheduled_date: Option<NaiveDate>,
    pub customer_name: String,
    pub customer_phone: String,
}

/// What the customer picked at checkout, apart from the cart itself.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSelections {
    pub delivery_mode: DeliveryMode,
    pub delivery_address: Option<String>,
    pub delivery_location: Option<GeoPoint>,
    pub payment_method: PaymentMethod,
    pub scheduled_date: Option<NaiveDate>,
    pub customer_name: String,
    pub customer_phone: String,
}

impl CheckoutSelections {
    /// Pick-up, cash on delivery, as soon as possible.
    pub fn pick_up(customer_name: impl Into<String>, customer_phone: impl Into<String>) -> Self {
        Self {
            delivery_mode: DeliveryMode::PickUp,
            delivery_address: None,
            delivery_location: None,
            payment_method: PaymentMethod::Cod,
            scheduled_date: None,
            customer_name: customer_name.into(),
            customer_phone: customer_phone.into(),
        }
    }

    pub fn delivery(
        customer_name: impl Into<String>,
        customer_phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            delivery_mode: DeliveryMode::Delivery,
            delivery_address: Some(address.into()),
            ..Self::pick_up(customer_name, customer_phone)
        }
    }
}

/// A submission that is malformed or incomplete. Never auto-corrected.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Quantity for product {0} must be at least 1")]
    InvalidQuantity(ProductId),
    #[error("Price for product {0} must not be negative")]
    NegativePrice(ProductId),
    #[error("Customer name is required")]
    MissingCustomerName,
    #[error("Customer phone is required")]
    MissingCustomerPhone,
    #[error("Delivery address is required")]
    MissingAddress,
    #[error("Delivery coordinates are invalid")]
    InvalidCoordinates,
    #[error("Product {0} is not available")]
    UnavailableProduct(ProductId),
    #[error("Order total is too large")]
    TotalOverflow,
}

impl PlaceOrderPayload {
    /// Captures the cart lines by value, so later catalog changes do not
    /// alter what was submitted.
    pub fn from_cart(lines: &[CartItemView], selections: &CheckoutSelections) -> Self {
        Self {
            cart_items: lines
                .iter()
                .map(|line| PlaceOrderLine {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    price: line.price,
                    name: line.name.clone(),
                })
                .collect(),
            delivery_mode: selections.delivery_mode,
            delivery_address: selections.delivery_address.clone(),
            delivery_lat: selections.delivery_location.map(|p| p.lat),
            delivery_lng: selections.delivery_location.map(|p| p.lng),
            payment_method: selections.payment_method,
            scheduled_date: selections.scheduled_date,
            customer_name: selections.customer_name.clone(),
            customer_phone: selections.customer_phone.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cart_items.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        for line in &self.cart_items {
            if line.quantity == 0 {
                return Err(ValidationError::InvalidQuantity(line.product_id));
            }
            if line.price < Decimal::ZERO {
                return Err(ValidationError::NegativePrice(line.product_id));
            }
        }
        self.totals(Decimal::ZERO)?;
        if self.customer_name.trim().is_empty() {
            return Err(ValidationError::MissingCustomerName);
        }
        if self.customer_phone.trim().is_empty() {
            return Err(ValidationError::MissingCustomerPhone);
        }
        if self.delivery_mode == DeliveryMode::Delivery && self.address().is_none() {
            return Err(ValidationError::MissingAddress);
        }
        match (self.delivery_lat, self.delivery_lng) {
            (None, None) => {}
            (Some(lat), Some(lng)) if (GeoPoint { lat, lng }).is_valid() => {}
            _ => return Err(ValidationError::InvalidCoordinates),
        }
        Ok(())
    }

    /// Totals of the submitted lines with `delivery_fee` applied per mode.
    pub fn totals(&self, delivery_fee: Decimal) -> Result<OrderTotals, ValidationError> {
        OrderTotals::compute(
            self.cart_items.iter().map(|l| (l.price, l.quantity)),
            self.delivery_mode,
            delivery_fee,
        )
        .ok_or(ValidationError::TotalOverflow)
    }

    /// The trimmed address, `None` when absent or blank.
    pub fn address(&self) -> Option<&str> {
        self.delivery_address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
    }

    pub fn location(&self) -> Option<GeoPoint> {
        match (self.delivery_lat, self.delivery_lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(mode: DeliveryMode, address: Option<&str>) -> PlaceOrderPayload {
        PlaceOrderPayload {
            cart_items: vec![PlaceOrderLine {
                product_id: ProductId(1),
                quantity: 2,
                price: Decimal::from(100),
                name: "Sapin-sapin".into(),
            }],
            delivery_mode: mode,
            delivery_address: address.map(str::to_string),
            delivery_lat: None,
            delivery_lng: None,
            payment_method: PaymentMethod::GCash,
            scheduled_date: None,
            customer_name: "Ana".into(),
            customer_phone: "0917 555 0101".into(),
        }
    }

    #[test]
    fn test_delivery_requires_address_pickup_does_not() {
        assert_eq!(
            payload(DeliveryMode::Delivery, None).validate(),
            Err(ValidationError::MissingAddress)
        );
        assert_eq!(
            payload(DeliveryMode::Delivery, Some("  ")).validate(),
            Err(ValidationError::MissingAddress)
        );
        assert_eq!(payload(DeliveryMode::PickUp, None).validate(), Ok(()));
    }

    #[test]
    fn test_line_and_customer_rules() {
        let mut p = payload(DeliveryMode::PickUp, None);
        p.cart_items[0].quantity = 0;
        assert_eq!(p.validate(), Err(ValidationError::InvalidQuantity(ProductId(1))));

        let mut p = payload(DeliveryMode::PickUp, None);
        p.customer_phone = " ".into();
        assert_eq!(p.validate(), Err(ValidationError::MissingCustomerPhone));

        let mut p = payload(DeliveryMode::PickUp, None);
        p.cart_items.clear();
        assert_eq!(p.validate(), Err(ValidationError::EmptyCart));
    }

    #[test]
    fn test_overflowing_total_is_rejected() {
        let mut p = payload(DeliveryMode::PickUp, None);
        p.cart_items[0].price = Decimal::from_str_exact("70000000000000000000000000000").unwrap();
        p.cart_items[0].quantity = 10;
        assert_eq!(p.validate(), Err(ValidationError::TotalOverflow));

        let mut p = payload(DeliveryMode::Delivery, Some("Lot 4, Rizal Ave"));
        p.cart_items[0].price = Decimal::MAX;
        p.cart_items[0].quantity = 1;
        assert_eq!(p.validate(), Ok(()));
        assert_eq!(p.totals(Decimal::from(50)), Err(ValidationError::TotalOverflow));
        assert_eq!(p.totals(Decimal::ZERO).map(|t| t.total), Ok(Decimal::MAX));
    }

    #[test]
    fn test_coordinates_come_in_pairs() {
        let mut p = payload(DeliveryMode::Delivery, Some("Lot 4, Rizal Ave"));
        p.delivery_lat = Some(14.6);
        assert_eq!(p.validate(), Err(ValidationError::InvalidCoordinates));
        p.delivery_lng = Some(121.0);
        assert_eq!(p.validate(), Ok(()));
        p.delivery_lat = Some(95.0);
        assert_eq!(p.validate(), Err(ValidationError::InvalidCoordinates));
    }

    #[test]
    fn test_wire_format_matches_endpoint() {
        let json = serde_json::to_value(payload(DeliveryMode::PickUp, None)).unwrap();
        assert_eq!(json["deliveryMode"], "Pick-up");
        assert_eq!(json["paymentMethod"], "GCash");
        assert_eq!(json["cartItems"][0]["product_id"], 1);
        assert_eq!(json["cartItems"][0]["price"], 100.0);
        assert!(json["deliveryAddress"].is_null());

        let back: PlaceOrderPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back.cart_items[0].price, Decimal::from(100));
    }
}
