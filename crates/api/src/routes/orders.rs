//! Order placement endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::OrderNumber;
use orders::{AvailabilityChecker, Order, OrderRequest, OrderService, OrderStore};
use resilience::CircuitBreaker;

use crate::error::ApiError;

/// Shared application state accessible from all order handlers.
pub struct OrderAppState<C: AvailabilityChecker, S: OrderStore> {
    pub order_service: OrderService<C, S>,
    /// Breaker guarding inventory lookups, reported by `/health`.
    pub inventory_circuit: Arc<CircuitBreaker>,
}

/// POST /api/order: place an order.
#[tracing::instrument(skip(state, req))]
pub async fn place<C, S>(
    State(state): State<Arc<OrderAppState<C, S>>>,
    Json(req): Json<OrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError>
where
    C: AvailabilityChecker + 'static,
    S: OrderStore + 'static,
{
    let order = state.order_service.place_order(req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/order/{order_number}: fetch a placed order.
#[tracing::instrument(skip(state))]
pub async fn get<C, S>(
    State(state): State<Arc<OrderAppState<C, S>>>,
    Path(order_number): Path<String>,
) -> Result<Json<Order>, ApiError>
where
    C: AvailabilityChecker + 'static,
    S: OrderStore + 'static,
{
    let order_number: OrderNumber = order_number
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid order number: {e}")))?;

    state
        .order_service
        .get_order(&order_number)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Order {order_number} not found")))
}
