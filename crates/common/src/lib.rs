//! Identifiers shared by the inventory and order services.

pub mod types;

pub use types::{OrderNumber, SkuCode};
