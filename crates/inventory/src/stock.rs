//! Stock record value type.

use common::SkuCode;
use serde::{Deserialize, Serialize};

/// Quantity on hand for a single SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub sku_code: SkuCode,
    pub quantity_on_hand: u32,
}

impl StockRecord {
    /// Creates a stock record.
    pub fn new(sku_code: impl Into<SkuCode>, quantity_on_hand: u32) -> Self {
        Self {
            sku_code: sku_code.into(),
            quantity_on_hand,
        }
    }

    /// Returns true if this record can satisfy `requested` units.
    ///
    /// The comparison is literal: a zero or negative request is always
    /// satisfied.
    pub fn covers(&self, requested: i32) -> bool {
        i64::from(self.quantity_on_hand) >= i64::from(requested)
    }
}
