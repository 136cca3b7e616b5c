//! Order commands.

use serde::{Deserialize, Serialize};

use crate::raw::string_or_number;

use super::state::{UnvalidatedOrder, UnvalidatedOrderLine};

/// Request to place an order, as received on the command queue.
///
/// Nothing here is validated; that is the first operation's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderCommand {
    pub customer_name: String,
    pub customer_email: String,
    pub delivery_street: String,
    pub delivery_city: String,
    pub delivery_postal_code: String,
    pub delivery_country: String,
    #[serde(default)]
    pub items: Vec<OrderItemCommand>,
}

/// One requested line. Quantity and price stay raw text until validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemCommand {
    pub product_name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub quantity: String,
    #[serde(deserialize_with = "string_or_number")]
    pub unit_price: String,
}

impl OrderItemCommand {
    /// Creates a new item from raw fields.
    pub fn new(
        product_name: impl Into<String>,
        quantity: impl Into<String>,
        unit_price: impl Into<String>,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            quantity: quantity.into(),
            unit_price: unit_price.into(),
        }
    }
}

impl From<PlaceOrderCommand> for UnvalidatedOrder {
    fn from(cmd: PlaceOrderCommand) -> Self {
        Self {
            customer_name: cmd.customer_name,
            customer_email: cmd.customer_email,
            delivery_street: cmd.delivery_street,
            delivery_city: cmd.delivery_city,
            delivery_postal_code: cmd.delivery_postal_code,
            delivery_country: cmd.delivery_country,
            lines: cmd
                .items
                .into_iter()
                .map(|item| UnvalidatedOrderLine {
                    product_name: item.product_name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect(),
        }
    }
}
