use async_trait::async_trait;
use common::SkuCode;

use super::{InventoryClient, InventoryClientError};

/// [`InventoryClient`] over HTTP.
///
/// Issues `GET {base_url}/api/inventory?skuCode=..&quantity=..` and expects a
/// JSON boolean body. Attempt timeouts are enforced by the caller's policy,
/// not by the underlying `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpInventoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpInventoryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl InventoryClient for HttpInventoryClient {
    async fn is_in_stock(
        &self,
        sku_code: &SkuCode,
        quantity: i32,
    ) -> Result<bool, InventoryClientError> {
        let url = format!("{}/api/inventory", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("skuCode", sku_code.as_str())])
            .query(&[("quantity", quantity)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, url, "inventory service returned an error status");
            return Err(InventoryClientError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<bool>().await?)
    }
}
