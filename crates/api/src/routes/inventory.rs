//! Stock lookup endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use common::SkuCode;
use inventory::{InventoryService, InventoryStore};
use serde::Deserialize;

use crate::error::ApiError;

/// Shared state of the inventory service.
pub struct InventoryAppState<S: InventoryStore> {
    pub inventory_service: InventoryService<S>,
}

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    #[serde(rename = "skuCode", alias = "skucode")]
    pub sku_code: SkuCode,
    pub quantity: i32,
}

/// GET /api/inventory?skuCode=..&quantity=..: answers with a JSON boolean.
///
/// Missing or unparsable parameters are rejected by the `Query` extractor
/// with `400 Bad Request`.
#[tracing::instrument(skip(state, query), fields(sku_code = %query.sku_code, quantity = query.quantity))]
pub async fn is_in_stock<S: InventoryStore + 'static>(
    State(state): State<Arc<InventoryAppState<S>>>,
    Query(query): Query<StockQuery>,
) -> Result<Json<bool>, ApiError> {
    if query.sku_code.is_blank() {
        return Err(ApiError::BadRequest("skuCode must not be blank".to_string()));
    }

    let in_stock = state
        .inventory_service
        .is_in_stock(&query.sku_code, query.quantity)
        .await?;
    Ok(Json(in_stock))
}
