use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderNumber;
use tokio::sync::RwLock;

use crate::error::OrderStoreError;
use crate::model::Order;
use crate::store::OrderStore;

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: HashMap<OrderNumber, Order>,
    fail_on_save: bool,
}

/// In-memory order store. Clones share the same orders.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures subsequent saves to fail.
    pub async fn set_fail_on_save(&self, fail: bool) {
        self.state.write().await.fail_on_save = fail;
    }

    /// Returns every stored order, in no particular order.
    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.values().cloned().collect()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn save(&self, order: Order) -> Result<Order, OrderStoreError> {
        let mut state = self.state.write().await;

        if state.fail_on_save {
            return Err(OrderStoreError::Unavailable(
                "order store rejected the write".to_string(),
            ));
        }

        state.orders.insert(order.order_number, order.clone());
        Ok(order)
    }

    async fn find(&self, order_number: &OrderNumber) -> Result<Option<Order>, OrderStoreError> {
        Ok(self.state.read().await.orders.get(order_number).cloned())
    }

    async fn count(&self) -> Result<usize, OrderStoreError> {
        Ok(self.state.read().await.orders.len())
    }
}
