//! Flat wire payloads exchanged between saga stages.
//!
//! These carry plain strings, decimals and timestamps only. Handlers map
//! domain events into them right before publishing and read them back on
//! the consuming side.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Type tags stamped on every envelope so consumers can route payloads.
pub mod message_types {
    pub const PLACE_ORDER_COMMAND: &str = "PlaceOrderCommand";
    pub const ORDER_PLACED: &str = "OrderPlacedDto";
    pub const INVOICE_GENERATED: &str = "InvoiceGeneratedDto";
    pub const PACKAGE_SHIPPED: &str = "PackageShippedDto";
    pub const PACKAGE_DELIVERED: &str = "PackageDeliveredDto";
    pub const SAGA_FAILED: &str = "SagaFailedDto";
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddressDto {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Published on `order-events` once an order is confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlacedDto {
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub total_amount: Decimal,
    pub placed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    pub delivery_address: DeliveryAddressDto,
}

/// Published on `invoice-events` once VAT has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceGeneratedDto {
    pub invoice_number: String,
    pub order_number: String,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub vat_amount: Decimal,
    pub total_with_vat: Decimal,
    pub generated_at: DateTime<Utc>,
}

/// Published on `package-events` when the courier has picked up the package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageShippedDto {
    pub order_number: String,
    pub tracking_number: String,
    pub shipped_at: DateTime<Utc>,
    pub delivery_address: DeliveryAddressDto,
    pub courier_message: String,
}

/// Published on `package-events` when the recipient has been identified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDeliveredDto {
    pub order_number: String,
    pub tracking_number: String,
    pub delivered_at: DateTime<Utc>,
    pub recipient_name: String,
}

/// Published on `saga-failures` when a stage rejects a request.
///
/// `success` is always false; it is carried so the payload reads the same
/// as the failure result clients get back from the request status route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SagaFailedDto {
    pub stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    pub success: bool,
    pub reasons: Vec<String>,
    pub failed_at: DateTime<Utc>,
}
