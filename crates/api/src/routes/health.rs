//! Health check endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use orders::{AvailabilityChecker, OrderStore};
use serde::Serialize;

use super::orders::OrderAppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_circuit: Option<&'static str>,
}

/// GET /health: returns service health status.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        inventory_circuit: None,
    })
}

/// GET /health: order service health, including the inventory circuit state.
pub async fn check_orders<C, S>(State(state): State<Arc<OrderAppState<C, S>>>) -> Json<HealthResponse>
where
    C: AvailabilityChecker + 'static,
    S: OrderStore + 'static,
{
    Json(HealthResponse {
        status: "ok",
        inventory_circuit: Some(state.inventory_circuit.state().as_str()),
    })
}
