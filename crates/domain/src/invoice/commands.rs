use serde::{Deserialize, Serialize};

use crate::raw::string_or_number;

use super::state::UnvalidatedInvoice;

/// Request to bill a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvoiceCommand {
    pub order_number: String,
    pub customer_name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub total_amount: String,
}

impl GenerateInvoiceCommand {
    pub fn new(
        order_number: impl Into<String>,
        customer_name: impl Into<String>,
        total_amount: impl Into<String>,
    ) -> Self {
        Self {
            order_number: order_number.into(),
            customer_name: customer_name.into(),
            total_amount: total_amount.into(),
        }
    }
}

impl From<GenerateInvoiceCommand> for UnvalidatedInvoice {
    fn from(cmd: GenerateInvoiceCommand) -> Self {
        Self {
            order_number: cmd.order_number,
            customer_name: cmd.customer_name,
            total_amount: cmd.total_amount,
        }
    }
}
