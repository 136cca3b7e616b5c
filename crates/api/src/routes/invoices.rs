use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use saga::{InvoiceRecord, InvoiceStateService};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::parse_order_number;

/// GET /invoices/{orderNumber}: the invoice issued for an order.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(order_number): Path<String>,
) -> Result<Json<InvoiceRecord>, ApiError> {
    let order_number = parse_order_number(&order_number)?;
    state
        .coordinator
        .invoices()
        .load_invoice(order_number.value())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Invoice for order {order_number} not found")))
}
