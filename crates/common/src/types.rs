use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stock keeping unit code, the key the inventory authority indexes stock by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkuCode(String);

impl SkuCode {
    /// Creates a SKU code from a string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the SKU code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the code is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for SkuCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SkuCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SkuCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SkuCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Server-generated order number.
///
/// Wraps a random UUID. Collisions are treated as negligible and are
/// not deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(Uuid);

impl OrderNumber {
    /// Generates a fresh random order number.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an order number from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderNumber {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for OrderNumber {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<OrderNumber> for Uuid {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}
