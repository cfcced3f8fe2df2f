use std::sync::Arc;

use async_trait::async_trait;
use common::SkuCode;
use resilience::{CircuitBreaker, ConfigError, Fallback, Resilience, ResilienceConfig};

use super::{AvailabilityChecker, AvailabilityQuery, InventoryClient};

const POLICY_NAME: &str = "inventory";

/// Wraps an [`InventoryClient`] in the `inventory` resilience policy.
///
/// Calls run through retry, circuit breaker and per-attempt timeout. When the
/// protected call still fails, the fallback hook runs and the configured
/// fallback value is returned instead.
pub struct ResilientInventoryClient<C> {
    client: C,
    resilience: Resilience,
    fallback: Fallback<bool, AvailabilityQuery>,
}

impl<C: InventoryClient> ResilientInventoryClient<C> {
    /// Builds the client, validating `config` first.
    pub fn new(client: C, config: &ResilienceConfig, fallback_value: bool) -> Result<Self, ConfigError> {
        let resilience = Resilience::new(POLICY_NAME, config)?;
        let fallback = Fallback::new(POLICY_NAME, fallback_value).on_fallback(log_unavailable);
        Ok(Self {
            client,
            resilience,
            fallback,
        })
    }

    /// Replaces the hook run whenever the fallback value is substituted.
    pub fn on_fallback<F>(mut self, hook: F) -> Self
    where
        F: Fn(&AvailabilityQuery, &str) + Send + Sync + 'static,
    {
        self.fallback = self.fallback.on_fallback(hook);
        self
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        self.resilience.breaker()
    }

    pub fn fallback_value(&self) -> bool {
        *self.fallback.value()
    }

    pub fn inner(&self) -> &C {
        &self.client
    }
}

fn log_unavailable(query: &AvailabilityQuery, reason: &str) {
    tracing::info!(
        quantity = query.quantity,
        "Cannot get inventory for skuCode {} failure reason: {}",
        query.sku_code,
        reason
    );
}

#[async_trait]
impl<C: InventoryClient> AvailabilityChecker for ResilientInventoryClient<C> {
    #[tracing::instrument(skip(self, sku_code), fields(sku_code = %sku_code))]
    async fn check_availability(&self, sku_code: &SkuCode, quantity: i32) -> bool {
        let result = self
            .resilience
            .call(|| self.client.is_in_stock(sku_code, quantity))
            .await;

        let query = AvailabilityQuery {
            sku_code: sku_code.clone(),
            quantity,
        };
        self.fallback.recover(&query, result)
    }
}
