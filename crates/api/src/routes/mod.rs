pub mod health;
pub mod invoices;
pub mod metrics;
pub mod orders;
pub mod packages;
pub mod products;

use domain::OrderNumber;

use crate::error::ApiError;

/// Rejects path segments that cannot be an order number.
pub(crate) fn parse_order_number(raw: &str) -> Result<OrderNumber, ApiError> {
    OrderNumber::try_parse(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}
