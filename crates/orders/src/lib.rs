//! Order placement.
//!
//! [`OrderService::place_order`] asks an [`AvailabilityChecker`] about the
//! requested SKU and, depending on the answer, persists a new [`Order`] or
//! rejects the request. The production checker is
//! [`ResilientInventoryClient`], which calls the inventory service over HTTP
//! behind retry, circuit breaker, timeout and fallback policies and therefore
//! always produces an answer.

pub mod client;
pub mod error;
pub mod memory;
pub mod model;
pub mod service;
pub mod store;

pub use client::{
    AvailabilityChecker, AvailabilityQuery, HttpInventoryClient, InventoryClient,
    InventoryClientError, ResilientInventoryClient,
};
pub use error::{OrderError, OrderStoreError, Rejection};
pub use memory::InMemoryOrderStore;
pub use model::{Order, OrderRequest};
pub use service::OrderService;
pub use store::OrderStore;
