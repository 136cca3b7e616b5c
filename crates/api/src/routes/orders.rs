//! Order intake and order state endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::PlaceOrderCommand;
use messaging::CorrelationId;
use saga::{OrderRecord, OrderStateService, OrderStatus, RejectionRecord};
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;
use crate::routes::parse_order_number;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAcceptedResponse {
    pub correlation_id: String,
    pub status: &'static str,
}

/// Where a submitted request stands.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RequestStatusResponse {
    /// Not placed or rejected yet.
    Pending,
    #[serde(rename_all = "camelCase")]
    Placed {
        order_number: String,
        order_status: OrderStatus,
    },
    /// Turned down by a saga stage, with its reasons.
    Rejected(RejectionRecord),
}

/// POST /orders: enqueue a `PlaceOrderCommand`.
///
/// Validation happens asynchronously in the saga, so the response only says
/// the command was accepted.
#[tracing::instrument(skip(state, command))]
pub async fn place(
    State(state): State<Arc<AppState>>,
    Json(command): Json<PlaceOrderCommand>,
) -> Result<(StatusCode, Json<OrderAcceptedResponse>), ApiError> {
    let correlation_id = state.coordinator.place_order(command).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(OrderAcceptedResponse {
            correlation_id: correlation_id.to_string(),
            status: "accepted",
        }),
    ))
}

/// GET /orders/{orderNumber}: the persisted order.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(order_number): Path<String>,
) -> Result<Json<OrderRecord>, ApiError> {
    let order_number = parse_order_number(&order_number)?;
    state
        .coordinator
        .orders()
        .load_order(order_number.value())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Order {order_number} not found")))
}

/// GET /orders/requests/{correlationId}: outcome of a submitted command.
///
/// A rejection wins over a placed order, since billing or shipping can
/// still turn down an order that was placed.
#[tracing::instrument(skip(state))]
pub async fn request_status(
    State(state): State<Arc<AppState>>,
    Path(correlation_id): Path<String>,
) -> Result<Json<RequestStatusResponse>, ApiError> {
    let correlation_id: CorrelationId = correlation_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid correlation id: {correlation_id}")))?;
    let orders = state.coordinator.orders();

    if let Some(rejection) = orders.load_rejection(correlation_id).await? {
        return Ok(Json(RequestStatusResponse::Rejected(rejection)));
    }

    let status = match orders.find_order_by_request(correlation_id).await? {
        Some(order) => RequestStatusResponse::Placed {
            order_number: order.order_number,
            order_status: order.status,
        },
        None => RequestStatusResponse::Pending,
    };
    Ok(Json(status))
}
