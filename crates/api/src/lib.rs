//! HTTP entrypoint for the order fulfillment saga.
//!
//! `POST /orders` enqueues a command; the saga runs in background consumers
//! and the read endpoints serve what the state services have persisted.
//! `GET /orders/requests/{correlationId}` reports whether a command was
//! placed or rejected.
//! Structured logging goes through `tracing` and metrics are exported in
//! Prometheus format.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use messaging::InMemoryTransport;
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{
    InMemoryInvoiceStateService, InMemoryOrderStateService, InMemoryPackageStateService,
    SagaCoordinator,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// The coordinator wired to the in-process transport and state services.
pub type Coordinator = SagaCoordinator<
    InMemoryTransport,
    InMemoryOrderStateService,
    InMemoryInvoiceStateService,
    InMemoryPackageStateService,
>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub coordinator: Coordinator,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::place))
        .route("/orders/{order_number}", get(routes::orders::get))
        .route(
            "/orders/requests/{correlation_id}",
            get(routes::orders::request_status),
        )
        .route("/invoices/{order_number}", get(routes::invoices::get))
        .route("/packages/{order_number}", get(routes::packages::get))
        .route("/products", get(routes::products::list))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state: in-memory transport, state services
/// seeded with the default catalog, and a coordinator that is not started.
pub fn create_default_state(config: &Config) -> Arc<AppState> {
    let transport = InMemoryTransport::with_max_delivery_count(config.max_delivery_count);
    let coordinator = SagaCoordinator::new(
        transport,
        InMemoryOrderStateService::with_default_catalog(),
        InMemoryInvoiceStateService::new(),
        InMemoryPackageStateService::new(),
        config.saga_config(),
    );

    Arc::new(AppState { coordinator })
}
