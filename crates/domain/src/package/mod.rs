//! Shipping: package lifecycle, courier hand-over and the shipping workflow.

mod commands;
mod events;
mod operations;
mod state;
mod workflow;

pub use commands::PickupPackageCommand;
pub use events::{PackageDelivered, PackageShipped, ShippingEvent};
pub use operations::{
    AssignAwbOperation, DeliverPackageOperation, PackageOperation, ShipPackageOperation,
    ValidatePackageOperation,
};
pub use state::{
    DeliveredPackage, InvalidPackage, Package, PreparedPackage, ShippedPackage,
    UnvalidatedPackage, ValidatedPackage,
};
pub use workflow::ShippingWorkflow;
