//! Availability predicate exposed by the inventory authority.

use common::SkuCode;

use crate::{InventoryStore, Result};

/// Answers availability queries against an [`InventoryStore`].
pub struct InventoryService<S: InventoryStore> {
    store: S,
}

impl<S: InventoryStore> InventoryService<S> {
    /// Creates a new inventory service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns true iff a stock record exists for `sku_code` with at least
    /// `quantity` units on hand.
    ///
    /// Unknown SKUs answer `false`. Non-positive quantities are compared
    /// literally, so any existing record satisfies them.
    #[tracing::instrument(skip(self, sku_code), fields(sku_code = %sku_code))]
    pub async fn is_in_stock(&self, sku_code: &SkuCode, quantity: i32) -> Result<bool> {
        let in_stock = self.store.exists_with_at_least(sku_code, quantity).await?;

        let result = if in_stock { "in_stock" } else { "out_of_stock" };
        metrics::counter!("inventory_checks_total", "result" => result).increment(1);
        tracing::debug!(quantity, in_stock, "availability checked");

        Ok(in_stock)
    }
}
