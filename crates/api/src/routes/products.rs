use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use saga::{OrderStateService, ProductStock};

use crate::AppState;
use crate::error::ApiError;

/// GET /products: catalog with remaining stock, sorted by name.
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ProductStock>>, ApiError> {
    Ok(Json(state.coordinator.orders().list_products().await?))
}
