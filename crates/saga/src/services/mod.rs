//! State services owning persisted orders, invoices and packages, with
//! in-memory implementations.

pub mod invoice_state;
pub mod order_state;
pub mod package_state;
pub mod rejection;

pub use invoice_state::{InMemoryInvoiceStateService, InvoiceRecord, InvoiceStateService};
pub use order_state::{
    DEFAULT_CATALOG, InMemoryOrderStateService, OrderLineRecord, OrderRecord, OrderStateService,
    OrderStatus, ProductStock,
};
pub use package_state::{
    InMemoryPackageStateService, PackageRecord, PackageStateService, PackageStatus,
};
pub use rejection::{RejectionRecord, SagaStage};
