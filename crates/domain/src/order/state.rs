//! Order lifecycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ValueError;
use crate::operation::Lifecycle;
use crate::value_objects::{DeliveryAddress, OrderNumber, Price};

/// The stages an order moves through while it is being placed.
///
/// State transitions:
/// ```text
/// Unvalidated ──► Validated ──► Confirmed ──► Paid
///      │              │             │
///      └──────────────┴─────────────┴──► Invalid
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state")]
pub enum Order {
    /// Raw input straight from the command.
    Unvalidated(UnvalidatedOrder),

    /// Every field parsed and stock confirmed.
    Validated(ValidatedOrder),

    /// Order number assigned and total computed.
    Confirmed(ConfirmedOrder),

    /// Payment confirmed.
    Paid(PaidOrder),

    /// One or more checks failed (absorbing).
    Invalid(InvalidOrder),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnvalidatedOrderLine {
    pub product_name: String,
    pub quantity: String,
    pub unit_price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnvalidatedOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub delivery_street: String,
    pub delivery_city: String,
    pub delivery_postal_code: String,
    pub delivery_country: String,
    pub lines: Vec<UnvalidatedOrderLine>,
}

/// A parsed order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Price,
}

impl OrderLine {
    /// Returns `quantity * unit_price`.
    pub fn line_total(&self) -> Result<Price, ValueError> {
        self.unit_price.multiply(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub address: DeliveryAddress,
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmedOrder {
    pub order_number: OrderNumber,
    pub customer_name: String,
    pub customer_email: String,
    pub address: DeliveryAddress,
    pub lines: Vec<OrderLine>,
    pub total_amount: Price,
    pub confirmed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaidOrder {
    pub order: ConfirmedOrder,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidOrder {
    pub reasons: Vec<String>,
}

impl InvalidOrder {
    pub fn new(reasons: Vec<String>) -> Self {
        Self { reasons }
    }

    pub fn single(reason: impl Into<String>) -> Self {
        Self {
            reasons: vec![reason.into()],
        }
    }
}

impl Lifecycle for Order {
    fn kind() -> &'static str {
        "Order"
    }

    fn state_name(&self) -> &'static str {
        match self {
            Order::Unvalidated(_) => "Unvalidated",
            Order::Validated(_) => "Validated",
            Order::Confirmed(_) => "Confirmed",
            Order::Paid(_) => "Paid",
            Order::Invalid(_) => "Invalid",
        }
    }

    fn is_invalid(&self) -> bool {
        matches!(self, Order::Invalid(_))
    }

    fn reasons(&self) -> &[String] {
        match self {
            Order::Invalid(invalid) => &invalid.reasons,
            _ => &[],
        }
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.state_name())
    }
}
