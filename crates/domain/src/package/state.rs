//! Package lifecycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::operation::Lifecycle;
use crate::value_objects::{Awb, DeliveryAddress, OrderNumber};

/// ```text
/// Unvalidated ──► Validated ──► Prepared ──► Shipped ──► Delivered
///      │              │            │           │
///      └──────────────┴────────────┴───────────┴──► Invalid
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state")]
pub enum Package {
    Unvalidated(UnvalidatedPackage),
    Validated(ValidatedPackage),
    /// Tracking number assigned, waiting for the courier.
    Prepared(PreparedPackage),
    /// Handed over to the courier.
    Shipped(ShippedPackage),
    Delivered(DeliveredPackage),
    Invalid(InvalidPackage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnvalidatedPackage {
    pub order_number: String,
    pub delivery_street: String,
    pub delivery_city: String,
    pub delivery_postal_code: String,
    pub delivery_country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedPackage {
    pub order_number: OrderNumber,
    pub address: DeliveryAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedPackage {
    pub order_number: OrderNumber,
    pub address: DeliveryAddress,
    pub tracking_number: Awb,
    pub prepared_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippedPackage {
    pub order_number: OrderNumber,
    pub address: DeliveryAddress,
    pub tracking_number: Awb,
    pub shipped_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveredPackage {
    pub order_number: OrderNumber,
    pub tracking_number: Awb,
    pub delivered_at: DateTime<Utc>,
    pub recipient_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidPackage {
    pub reasons: Vec<String>,
}

impl InvalidPackage {
    pub fn new(reasons: Vec<String>) -> Self {
        Self { reasons }
    }

    pub fn single(reason: impl Into<String>) -> Self {
        Self {
            reasons: vec![reason.into()],
        }
    }
}

impl Lifecycle for Package {
    fn kind() -> &'static str {
        "Package"
    }

    fn state_name(&self) -> &'static str {
        match self {
            Package::Unvalidated(_) => "Unvalidated",
            Package::Validated(_) => "Validated",
            Package::Prepared(_) => "Prepared",
            Package::Shipped(_) => "Shipped",
            Package::Delivered(_) => "Delivered",
            Package::Invalid(_) => "Invalid",
        }
    }

    fn is_invalid(&self) -> bool {
        matches!(self, Package::Invalid(_))
    }

    fn reasons(&self) -> &[String] {
        match self {
            Package::Invalid(invalid) => &invalid.reasons,
            _ => &[],
        }
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.state_name())
    }
}
