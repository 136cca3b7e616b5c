//! Topic and subscription names wiring the saga stages together.
//!
//! ```text
//! order-commands ─► order-processor ─► order-events ─► billing
//!   ─► invoice-events ─► shipping ─► package-events ─► order-tracking
//!
//! any stage ─► saga-failures ─► order-tracking
//! ```

/// Queue carrying `PlaceOrderCommand`s.
pub const ORDER_COMMANDS: &str = "order-commands";
pub const ORDER_PROCESSOR_SUBSCRIPTION: &str = "order-processor";

/// Topic carrying `OrderPlacedDto`s.
pub const ORDER_EVENTS: &str = "order-events";
pub const BILLING_SUBSCRIPTION: &str = "billing";

/// Topic carrying `InvoiceGeneratedDto`s.
pub const INVOICE_EVENTS: &str = "invoice-events";
pub const SHIPPING_SUBSCRIPTION: &str = "shipping";

/// Topic carrying `PackageShippedDto`s and `PackageDeliveredDto`s.
pub const PACKAGE_EVENTS: &str = "package-events";
pub const ORDER_TRACKING_SUBSCRIPTION: &str = "order-tracking";

/// Topic carrying `SagaFailedDto`s from every stage.
pub const SAGA_FAILURES: &str = "saga-failures";
