//! Inventory error types.

use thiserror::Error;

/// Errors raised by the inventory authority.
///
/// A missing SKU is not an error; the availability predicate answers
/// `false` for it. Only failures of the backing store surface here.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The backing store could not be read or written.
    #[error("Inventory store error: {0}")]
    Store(String),
}

/// Result type for inventory operations.
pub type Result<T> = std::result::Result<T, InventoryError>;
