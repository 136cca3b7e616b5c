//! Order fulfillment saga.
//!
//! Three stages run as independent consumers and talk only through the
//! message transport:
//!
//! 1. **Order placement** validates and confirms a `PlaceOrderCommand`,
//!    deducts stock and publishes `OrderPlacedDto`.
//! 2. **Billing** computes VAT and publishes `InvoiceGeneratedDto`.
//! 3. **Shipping** assigns a tracking number, hands the package over and
//!    publishes `PackageShippedDto` or `PackageDeliveredDto`.
//!
//! The order number is the business key across stages; the correlation id
//! stamped on the first command follows every event. A stage that rejects a
//! request stores the failure under that correlation id and publishes
//! `SagaFailedDto` on `saga-failures`.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod handlers;
pub mod services;
pub mod topics;

pub use config::SagaConfig;
pub use coordinator::{SagaCoordinator, SagaHandle};
pub use error::{Result, SagaError};
pub use handlers::{
    BillingHandler, FailureTrackingHandler, PackageTrackingHandler, PlaceOrderHandler,
    ShippingHandler,
};
pub use services::{
    DEFAULT_CATALOG, InMemoryInvoiceStateService, InMemoryOrderStateService,
    InMemoryPackageStateService, InvoiceRecord, InvoiceStateService, OrderLineRecord,
    OrderRecord, OrderStateService, OrderStatus, PackageRecord, PackageStateService,
    PackageStatus, ProductStock, RejectionRecord, SagaStage,
};
