use async_trait::async_trait;
use common::OrderNumber;

use crate::error::OrderStoreError;
use crate::model::Order;

/// Storage for placed orders.
///
/// A save is a single atomic insert. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order and returns it as stored.
    async fn save(&self, order: Order) -> Result<Order, OrderStoreError>;

    async fn find(&self, order_number: &OrderNumber) -> Result<Option<Order>, OrderStoreError>;

    /// Number of persisted orders.
    async fn count(&self) -> Result<usize, OrderStoreError>;
}
