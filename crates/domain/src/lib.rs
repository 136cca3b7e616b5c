//! Domain core of the order fulfillment saga.
//!
//! This crate provides:
//! - Value objects that cannot exist in an invalid form
//! - Closed lifecycles for orders, invoices and packages
//! - Operations: pure single-step transitions over a lifecycle
//! - Workflows that chain operations and map the final state to an event

pub mod error;
pub mod invoice;
pub mod operation;
pub mod order;
pub mod package;
mod raw;
pub mod value_objects;

use rust_decimal::Decimal;

pub use error::ValueError;
pub use invoice::{BillingWorkflow, GenerateInvoiceCommand, InvoiceGenerated, InvoiceGeneratedEvent};
pub use operation::{Lifecycle, Operation, WorkflowFailure, run_pipeline};
pub use order::{
    OrderItemCommand, OrderPlaced, OrderPlacedEvent, OrderProcessingWorkflow, PlaceOrderCommand,
};
pub use package::{
    PackageDelivered, PackageShipped, PickupPackageCommand, ShippingEvent, ShippingWorkflow,
};
pub use value_objects::{Awb, DEFAULT_CARRIER_PREFIX, DeliveryAddress, OrderNumber, Price};

/// Romanian standard VAT rate, 19%.
pub const DEFAULT_VAT_RATE: Decimal = Decimal::from_parts(19, 0, 0, false, 2);
