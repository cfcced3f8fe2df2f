//! Order request and persisted order.

use common::{OrderNumber, SkuCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request to place an order.
///
/// `id` and `order_number` are accepted for compatibility with existing
/// callers but are ignored when the order is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub id: Option<i64>,
    pub order_number: Option<String>,
    #[serde(alias = "skucode")]
    pub sku_code: SkuCode,
    pub price: Decimal,
    pub quantity: i32,
}

impl OrderRequest {
    pub fn new(sku_code: impl Into<SkuCode>, price: Decimal, quantity: i32) -> Self {
        Self {
            id: None,
            order_number: None,
            sku_code: sku_code.into(),
            price,
            quantity,
        }
    }
}

/// A placed order. Never mutated after it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_number: OrderNumber,
    pub sku_code: SkuCode,
    pub price: Decimal,
    pub quantity: i32,
}

impl Order {
    /// Builds a new order from a request under a freshly generated order
    /// number, discarding the caller-supplied `id` and `order_number`.
    pub fn from_request(request: OrderRequest) -> Self {
        Self {
            order_number: OrderNumber::generate(),
            sku_code: request.sku_code,
            price: request.price,
            quantity: request.quantity,
        }
    }
}
