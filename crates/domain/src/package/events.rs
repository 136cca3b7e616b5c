use chrono::{DateTime, Utc};
use common::{PackageDeliveredDto, PackageShippedDto};
use serde::Serialize;

use crate::operation::WorkflowFailure;
use crate::value_objects::{Awb, DeliveryAddress, OrderNumber};

use super::state::{DeliveredPackage, Package, ShippedPackage};

/// Outcome of [`ShippingWorkflow`](super::ShippingWorkflow).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ShippingEvent {
    Shipped(PackageShipped),
    Delivered(PackageDelivered),
    Failed(WorkflowFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageShipped {
    pub order_number: OrderNumber,
    pub tracking_number: Awb,
    pub delivery_address: DeliveryAddress,
    pub shipped_at: DateTime<Utc>,
}

impl From<ShippedPackage> for PackageShipped {
    fn from(package: ShippedPackage) -> Self {
        Self {
            order_number: package.order_number,
            tracking_number: package.tracking_number,
            delivery_address: package.address,
            shipped_at: package.shipped_at,
        }
    }
}

impl PackageShipped {
    pub fn to_dto(&self) -> PackageShippedDto {
        PackageShippedDto {
            order_number: self.order_number.to_string(),
            tracking_number: self.tracking_number.to_string(),
            shipped_at: self.shipped_at,
            delivery_address: self.delivery_address.to_dto(),
            courier_message: format!("Package {} handed over to courier", self.tracking_number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDelivered {
    pub order_number: OrderNumber,
    pub tracking_number: Awb,
    pub delivered_at: DateTime<Utc>,
    pub recipient_name: String,
}

impl From<DeliveredPackage> for PackageDelivered {
    fn from(package: DeliveredPackage) -> Self {
        Self {
            order_number: package.order_number,
            tracking_number: package.tracking_number,
            delivered_at: package.delivered_at,
            recipient_name: package.recipient_name,
        }
    }
}

impl PackageDelivered {
    pub fn to_dto(&self) -> PackageDeliveredDto {
        PackageDeliveredDto {
            order_number: self.order_number.to_string(),
            tracking_number: self.tracking_number.to_string(),
            delivered_at: self.delivered_at,
            recipient_name: self.recipient_name.clone(),
        }
    }
}

impl ShippingEvent {
    /// Maps any package state to an event.
    ///
    /// `Shipped` and `Delivered` succeed. Earlier states fail with the name
    /// of the stage that was not reached.
    pub fn from_package(package: Package) -> Self {
        match package {
            Package::Shipped(package) => Self::Shipped(package.into()),
            Package::Delivered(package) => Self::Delivered(package.into()),
            Package::Unvalidated(_) => {
                Self::Failed(WorkflowFailure::single("Package was not validated"))
            }
            Package::Validated(_) => {
                Self::Failed(WorkflowFailure::single("Package was not prepared"))
            }
            Package::Prepared(_) => {
                Self::Failed(WorkflowFailure::single("Package was not shipped"))
            }
            Package::Invalid(invalid) => Self::Failed(WorkflowFailure::new(invalid.reasons)),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Order number of a successful event.
    pub fn order_number(&self) -> Option<&OrderNumber> {
        match self {
            Self::Shipped(shipped) => Some(&shipped.order_number),
            Self::Delivered(delivered) => Some(&delivered.order_number),
            Self::Failed(_) => None,
        }
    }
}
