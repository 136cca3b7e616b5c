use crate::operation::{Lifecycle, Operation, run_pipeline};
use crate::value_objects::{Awb, OrderNumber};

use super::commands::PickupPackageCommand;
use super::events::ShippingEvent;
use super::operations::{
    AssignAwbOperation, DeliverPackageOperation, ShipPackageOperation, ValidatePackageOperation,
};
use super::state::{Package, UnvalidatedPackage};

/// Ships an invoiced order: validate, assign a tracking number, hand over to
/// the courier and, when a recipient lookup is given, record delivery.
pub struct ShippingWorkflow;

impl ShippingWorkflow {
    pub fn execute<G, N>(
        command: PickupPackageCommand,
        awb_generator: G,
        notify_courier: N,
    ) -> ShippingEvent
    where
        G: Fn() -> String,
        N: Fn(&Awb) -> bool,
    {
        let assign = AssignAwbOperation::new(awb_generator);
        let ship = ShipPackageOperation::new(notify_courier);
        let steps: [&dyn Operation<Package>; 3] = [&ValidatePackageOperation, &assign, &ship];

        Self::finish(run_pipeline(
            Package::Unvalidated(UnvalidatedPackage::from(command)),
            &steps,
        ))
    }

    pub fn execute_with_delivery<G, N, R>(
        command: PickupPackageCommand,
        awb_generator: G,
        notify_courier: N,
        recipient_lookup: R,
    ) -> ShippingEvent
    where
        G: Fn() -> String,
        N: Fn(&Awb) -> bool,
        R: Fn(&OrderNumber) -> String,
    {
        let assign = AssignAwbOperation::new(awb_generator);
        let ship = ShipPackageOperation::new(notify_courier);
        let deliver = DeliverPackageOperation::new(recipient_lookup);
        let steps: [&dyn Operation<Package>; 4] =
            [&ValidatePackageOperation, &assign, &ship, &deliver];

        Self::finish(run_pipeline(
            Package::Unvalidated(UnvalidatedPackage::from(command)),
            &steps,
        ))
    }

    fn finish(package: Package) -> ShippingEvent {
        let outcome = if package.is_invalid() { "failed" } else { "succeeded" };
        metrics::counter!(
            "workflow_executions_total",
            "workflow" => "shipping",
            "outcome" => outcome
        )
        .increment(1);
        ShippingEvent::from_package(package)
    }
}
