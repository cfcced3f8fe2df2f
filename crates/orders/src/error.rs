//! Order error types.

use common::SkuCode;
use thiserror::Error;

/// Business rejection of an order request.
///
/// Carries the SKU so the transport layer can report which product was
/// refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Product {sku_code} is not in stock, please try again later")]
pub struct Rejection {
    pub sku_code: SkuCode,
}

impl Rejection {
    pub fn new(sku_code: SkuCode) -> Self {
        Self { sku_code }
    }
}

/// Errors raised by an order store.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    /// The store could not accept or serve the request.
    #[error("Order store unavailable: {0}")]
    Unavailable(String),
}

/// Terminal outcomes of an order placement other than success.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request was refused by the placement rule; nothing was persisted.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The order could not be durably written.
    #[error("Order could not be persisted: {0}")]
    Persistence(#[from] OrderStoreError),
}
