//! Operations over the package lifecycle.

use chrono::Utc;

use crate::operation::Operation;
use crate::value_objects::{Awb, DeliveryAddress, OrderNumber};

use super::state::{
    DeliveredPackage, InvalidPackage, Package, PreparedPackage, ShippedPackage,
    UnvalidatedPackage, ValidatedPackage,
};

/// Per-variant hooks for a package operation. Every hook defaults to identity.
pub trait PackageOperation {
    const NAME: &'static str;

    fn on_unvalidated(&self, package: UnvalidatedPackage) -> Package {
        Package::Unvalidated(package)
    }

    fn on_validated(&self, package: ValidatedPackage) -> Package {
        Package::Validated(package)
    }

    fn on_prepared(&self, package: PreparedPackage) -> Package {
        Package::Prepared(package)
    }

    fn on_shipped(&self, package: ShippedPackage) -> Package {
        Package::Shipped(package)
    }

    fn on_delivered(&self, package: DeliveredPackage) -> Package {
        Package::Delivered(package)
    }
}

impl<T: PackageOperation> Operation<Package> for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn transform(&self, package: Package) -> Package {
        match package {
            Package::Unvalidated(p) => self.on_unvalidated(p),
            Package::Validated(p) => self.on_validated(p),
            Package::Prepared(p) => self.on_prepared(p),
            Package::Shipped(p) => self.on_shipped(p),
            Package::Delivered(p) => self.on_delivered(p),
            Package::Invalid(p) => Package::Invalid(p),
        }
    }
}

/// Parses the order number and the delivery address.
pub struct ValidatePackageOperation;

impl PackageOperation for ValidatePackageOperation {
    const NAME: &'static str = "validate_package";

    fn on_unvalidated(&self, package: UnvalidatedPackage) -> Package {
        let order_number = OrderNumber::try_parse(&package.order_number);
        let address = DeliveryAddress::try_new(
            &package.delivery_street,
            &package.delivery_city,
            &package.delivery_postal_code,
            &package.delivery_country,
        );

        match (order_number, address) {
            (Ok(order_number), Ok(address)) => {
                Package::Validated(ValidatedPackage {
                    order_number,
                    address,
                })
            }
            (order_number, address) => {
                let mut reasons = Vec::new();
                if order_number.is_err() {
                    reasons.push("Invalid order number format".to_string());
                }
                if address.is_err() {
                    reasons.push("Invalid delivery address".to_string());
                }
                Package::Invalid(InvalidPackage::new(reasons))
            }
        }
    }
}

/// Assigns a tracking number from an injected generator.
pub struct AssignAwbOperation<G> {
    awb_generator: G,
}

impl<G> AssignAwbOperation<G>
where
    G: Fn() -> String,
{
    pub fn new(awb_generator: G) -> Self {
        Self { awb_generator }
    }
}

impl<G> PackageOperation for AssignAwbOperation<G>
where
    G: Fn() -> String,
{
    const NAME: &'static str = "assign_awb";

    fn on_validated(&self, package: ValidatedPackage) -> Package {
        match Awb::try_parse(&(self.awb_generator)()) {
            Ok(tracking_number) => Package::Prepared(PreparedPackage {
                order_number: package.order_number,
                address: package.address,
                tracking_number,
                prepared_at: Utc::now(),
            }),
            Err(_) => Package::Invalid(InvalidPackage::single(
                "Failed to generate valid AWB tracking number",
            )),
        }
    }
}

/// Hands a prepared package to the courier.
pub struct ShipPackageOperation<N> {
    notify_courier: N,
}

impl<N> ShipPackageOperation<N>
where
    N: Fn(&Awb) -> bool,
{
    pub fn new(notify_courier: N) -> Self {
        Self { notify_courier }
    }
}

impl<N> PackageOperation for ShipPackageOperation<N>
where
    N: Fn(&Awb) -> bool,
{
    const NAME: &'static str = "ship_package";

    fn on_prepared(&self, package: PreparedPackage) -> Package {
        if !(self.notify_courier)(&package.tracking_number) {
            return Package::Invalid(InvalidPackage::single("Failed to notify courier service"));
        }
        Package::Shipped(ShippedPackage {
            order_number: package.order_number,
            address: package.address,
            tracking_number: package.tracking_number,
            shipped_at: Utc::now(),
        })
    }
}

/// Records delivery to the recipient returned by an injected lookup.
pub struct DeliverPackageOperation<R> {
    recipient_lookup: R,
}

impl<R> DeliverPackageOperation<R>
where
    R: Fn(&OrderNumber) -> String,
{
    pub fn new(recipient_lookup: R) -> Self {
        Self { recipient_lookup }
    }
}

impl<R> PackageOperation for DeliverPackageOperation<R>
where
    R: Fn(&OrderNumber) -> String,
{
    const NAME: &'static str = "deliver_package";

    fn on_shipped(&self, package: ShippedPackage) -> Package {
        let recipient_name = (self.recipient_lookup)(&package.order_number);
        if recipient_name.trim().is_empty() {
            return Package::Invalid(InvalidPackage::single(
                "Failed to identify recipient for delivery",
            ));
        }
        Package::Delivered(DeliveredPackage {
            order_number: package.order_number,
            tracking_number: package.tracking_number,
            delivered_at: Utc::now(),
            recipient_name: recipient_name.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Lifecycle;

    fn raw(order_number: &str, street: &str) -> Package {
        Package::Unvalidated(UnvalidatedPackage {
            order_number: order_number.to_string(),
            delivery_street: street.to_string(),
            delivery_city: "Brasov".to_string(),
            delivery_postal_code: "500001".to_string(),
            delivery_country: "RO".to_string(),
        })
    }

    fn validated() -> Package {
        ValidatePackageOperation.transform(raw("ORD-20250101-0001", "Str. Republicii 5"))
    }

    fn prepared() -> Package {
        AssignAwbOperation::new(|| "RO2501011200".to_string()).transform(validated())
    }

    fn shipped() -> Package {
        ShipPackageOperation::new(|_: &Awb| true).transform(prepared())
    }

    fn delivered() -> Package {
        DeliverPackageOperation::new(|_: &OrderNumber| "Ana".to_string()).transform(shipped())
    }

    #[test]
    fn test_happy_path_walks_every_state() {
        assert_eq!(validated().state_name(), "Validated");
        assert_eq!(prepared().state_name(), "Prepared");
        assert_eq!(shipped().state_name(), "Shipped");

        let Package::Delivered(package) = delivered() else {
            panic!("expected Delivered");
        };
        assert_eq!(package.tracking_number.value(), "RO2501011200");
        assert_eq!(package.recipient_name, "Ana");
    }

    #[test]
    fn test_validate_accumulates_all_errors() {
        let package = ValidatePackageOperation.transform(raw("ORD-123", ""));
        assert_eq!(
            package.reasons(),
            &[
                "Invalid order number format".to_string(),
                "Invalid delivery address".to_string(),
            ]
        );
    }

    #[test]
    fn test_dependency_failures_become_invalid() {
        let bad_awb = AssignAwbOperation::new(|| "ro-123".to_string()).transform(validated());
        assert_eq!(
            bad_awb.reasons(),
            &["Failed to generate valid AWB tracking number".to_string()]
        );

        let not_notified = ShipPackageOperation::new(|_: &Awb| false).transform(prepared());
        assert_eq!(
            not_notified.reasons(),
            &["Failed to notify courier service".to_string()]
        );

        let no_recipient =
            DeliverPackageOperation::new(|_: &OrderNumber| "  ".to_string()).transform(shipped());
        assert_eq!(
            no_recipient.reasons(),
            &["Failed to identify recipient for delivery".to_string()]
        );
    }

    #[test]
    fn test_operations_are_noop_on_untargeted_variants() {
        let all = vec![
            raw("ORD-20250101-0001", "Str. Republicii 5"),
            validated(),
            prepared(),
            shipped(),
            delivered(),
            Package::Invalid(InvalidPackage::single("earlier failure")),
        ];

        let validate = ValidatePackageOperation;
        let assign = AssignAwbOperation::new(|| "XX0000000000".to_string());
        let ship = ShipPackageOperation::new(|_: &Awb| false);
        let deliver = DeliverPackageOperation::new(|_: &OrderNumber| String::new());

        let cases: [(&dyn Operation<Package>, &str); 4] = [
            (&validate, "Unvalidated"),
            (&assign, "Validated"),
            (&ship, "Prepared"),
            (&deliver, "Shipped"),
        ];

        for (operation, targeted) in cases {
            for variant in all.iter().filter(|v| v.state_name() != targeted) {
                assert_eq!(
                    operation.transform(variant.clone()),
                    *variant,
                    "{} changed {}",
                    operation.name(),
                    variant.state_name()
                );
            }
        }
    }
}
