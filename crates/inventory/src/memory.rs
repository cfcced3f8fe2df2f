use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::SkuCode;
use tokio::sync::RwLock;

use crate::{InventoryError, InventoryStore, Result, StockRecord};

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    records: HashMap<SkuCode, StockRecord>,
    fail_on_read: bool,
}

/// In-memory inventory store.
///
/// Backs the inventory service binary and the tests. Clones share the
/// same underlying records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryStore {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given records.
    ///
    /// Later records for the same SKU replace earlier ones.
    pub fn with_records(records: impl IntoIterator<Item = StockRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.sku_code.clone(), r))
            .collect();
        Self {
            state: Arc::new(RwLock::new(InMemoryInventoryState {
                records,
                fail_on_read: false,
            })),
        }
    }

    /// Configures reads to fail, simulating an unavailable store.
    pub async fn set_fail_on_read(&self, fail: bool) {
        self.state.write().await.fail_on_read = fail;
    }

    /// Returns the number of stored records.
    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn exists_with_at_least(&self, sku_code: &SkuCode, quantity: i32) -> Result<bool> {
        let state = self.state.read().await;
        if state.fail_on_read {
            return Err(InventoryError::Store("inventory store unavailable".to_string()));
        }

        Ok(state
            .records
            .get(sku_code)
            .is_some_and(|record| record.covers(quantity)))
    }

    async fn get(&self, sku_code: &SkuCode) -> Result<Option<StockRecord>> {
        let state = self.state.read().await;
        if state.fail_on_read {
            return Err(InventoryError::Store("inventory store unavailable".to_string()));
        }
        Ok(state.records.get(sku_code).cloned())
    }

    async fn upsert(&self, record: StockRecord) -> Result<()> {
        let mut state = self.state.write().await;
        state.records.insert(record.sku_code.clone(), record);
        Ok(())
    }
}
