//! Inventory authority.
//!
//! Owns stock records and answers one question: is quantity `Q` of SKU `S`
//! available? The store is behind the [`InventoryStore`] trait so the
//! in-memory implementation can be replaced by a real persistence engine.

pub mod error;
pub mod memory;
pub mod service;
pub mod stock;
pub mod store;

pub use error::{InventoryError, Result};
pub use memory::InMemoryInventoryStore;
pub use service::InventoryService;
pub use stock::StockRecord;
pub use store::InventoryStore;
