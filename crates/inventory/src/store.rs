use async_trait::async_trait;
use common::SkuCode;

use crate::{Result, StockRecord};

/// Storage for stock records, keyed uniquely by SKU code.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Returns true if a record exists for `sku_code` with at least
    /// `quantity` units on hand.
    ///
    /// This is an existence check: a missing SKU answers `false` rather
    /// than failing.
    async fn exists_with_at_least(&self, sku_code: &SkuCode, quantity: i32) -> Result<bool>;

    /// Retrieves the record for a SKU, if any.
    async fn get(&self, sku_code: &SkuCode) -> Result<Option<StockRecord>>;

    /// Inserts or replaces the record for the record's SKU.
    async fn upsert(&self, record: StockRecord) -> Result<()>;
}
