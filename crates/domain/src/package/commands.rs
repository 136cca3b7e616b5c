use serde::{Deserialize, Serialize};

use super::state::UnvalidatedPackage;

/// Request to hand an order's package to the courier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupPackageCommand {
    pub order_number: String,
    pub delivery_street: String,
    pub delivery_city: String,
    pub delivery_postal_code: String,
    pub delivery_country: String,
}

impl From<PickupPackageCommand> for UnvalidatedPackage {
    fn from(cmd: PickupPackageCommand) -> Self {
        Self {
            order_number: cmd.order_number,
            delivery_street: cmd.delivery_street,
            delivery_city: cmd.delivery_city,
            delivery_postal_code: cmd.delivery_postal_code,
            delivery_country: cmd.delivery_country,
        }
    }
}
