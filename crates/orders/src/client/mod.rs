//! Inventory availability lookups.
//!
//! [`InventoryClient`] is the raw remote call and can fail.
//! [`AvailabilityChecker`] is what the order workflow consumes: it always
//! answers, turning failures into a configured default.

mod http;
mod resilient;

use async_trait::async_trait;
use common::SkuCode;
use resilience::Retryable;
use thiserror::Error;

pub use http::HttpInventoryClient;
pub use resilient::ResilientInventoryClient;

/// Failures of a single call to the inventory service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryClientError {
    #[error("cannot connect to inventory service: {0}")]
    Connect(String),

    #[error("inventory request timed out: {0}")]
    Timeout(String),

    #[error("inventory transport error: {0}")]
    Transport(String),

    #[error("inventory service responded with status {status}")]
    Status { status: u16 },

    #[error("malformed inventory response: {0}")]
    Decode(String),
}

impl Retryable for InventoryClientError {
    /// Transport failures, server errors, 408 and 429 are worth retrying.
    /// Other client errors and undecodable bodies are not.
    fn is_retryable(&self) -> bool {
        match self {
            Self::Connect(_) | Self::Timeout(_) | Self::Transport(_) => true,
            Self::Status { status } => *status >= 500 || *status == 408 || *status == 429,
            Self::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for InventoryClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Remote stock lookup.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Asks the inventory service whether `quantity` units of `sku_code`
    /// are available.
    async fn is_in_stock(&self, sku_code: &SkuCode, quantity: i32)
    -> Result<bool, InventoryClientError>;
}

/// Availability source for order placement. Never fails.
#[async_trait]
pub trait AvailabilityChecker: Send + Sync {
    async fn check_availability(&self, sku_code: &SkuCode, quantity: i32) -> bool;
}

/// Context handed to fallback hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub sku_code: SkuCode,
    pub quantity: i32,
}
