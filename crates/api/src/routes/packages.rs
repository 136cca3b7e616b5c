use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use saga::{PackageRecord, PackageStateService};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::parse_order_number;

/// GET /packages/{orderNumber}: shipping state of an order's package.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(order_number): Path<String>,
) -> Result<Json<PackageRecord>, ApiError> {
    let order_number = parse_order_number(&order_number)?;
    state
        .coordinator
        .packages()
        .load_package(order_number.value())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Package for order {order_number} not found")))
}
