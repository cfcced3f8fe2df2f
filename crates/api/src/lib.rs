//! HTTP services for inventory lookups and order placement.
//!
//! Two routers are built here: the inventory service, which answers stock
//! questions from its own store, and the order service, which consults the
//! inventory service through a resilient client before persisting orders.
//! Both carry structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use inventory::{InMemoryInventoryStore, InventoryService, InventoryStore};
use metrics_exporter_prometheus::PrometheusHandle;
use orders::{
    AvailabilityChecker, HttpInventoryClient, InMemoryOrderStore, OrderService, OrderStore,
    ResilientInventoryClient,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::{ConfigError, InventoryServiceConfig, OrderServiceConfig};
use routes::inventory::InventoryAppState;
use routes::orders::OrderAppState;

/// Order service state as wired by the `order-service` binary.
pub type DefaultOrderState =
    OrderAppState<ResilientInventoryClient<HttpInventoryClient>, InMemoryOrderStore>;

/// Creates the inventory service router.
pub fn create_inventory_app<S: InventoryStore + 'static>(
    state: Arc<InventoryAppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/inventory", get(routes::inventory::is_in_stock::<S>))
        .with_state(state)
        .merge(metrics_router(metrics_handle))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
}

/// Creates the order service router.
pub fn create_order_app<C, S>(
    state: Arc<OrderAppState<C, S>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    C: AvailabilityChecker + 'static,
    S: OrderStore + 'static,
{
    Router::new()
        .route("/health", get(routes::health::check_orders::<C, S>))
        .route("/api/order", post(routes::orders::place::<C, S>))
        .route("/api/order/{order_number}", get(routes::orders::get::<C, S>))
        .with_state(state)
        .merge(metrics_router(metrics_handle))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
}

fn metrics_router(metrics_handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Creates the inventory state, seeded from configuration.
pub fn create_inventory_state(
    config: &InventoryServiceConfig,
) -> Arc<InventoryAppState<InMemoryInventoryStore>> {
    let store = InMemoryInventoryStore::with_records(config.seed.iter().cloned());
    Arc::new(InventoryAppState {
        inventory_service: InventoryService::new(store),
    })
}

/// Creates the order state: an HTTP inventory client wrapped in the
/// configured resilience policy, and an in-memory order store.
pub fn create_order_state(config: &OrderServiceConfig) -> Result<Arc<DefaultOrderState>, ConfigError> {
    let client = HttpInventoryClient::new(config.inventory_url.as_str());
    let checker = ResilientInventoryClient::new(client, &config.resilience, config.fallback)?;
    let inventory_circuit = Arc::clone(checker.breaker());

    Ok(Arc::new(OrderAppState {
        order_service: OrderService::new(checker, InMemoryOrderStore::new()),
        inventory_circuit,
    }))
}
