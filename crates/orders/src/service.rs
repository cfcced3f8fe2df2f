use common::OrderNumber;

use crate::client::AvailabilityChecker;
use crate::error::{OrderError, Rejection};
use crate::model::{Order, OrderRequest};
use crate::store::OrderStore;

/// Places orders after consulting an availability checker.
pub struct OrderService<C, S> {
    checker: C,
    store: S,
}

impl<C, S> OrderService<C, S>
where
    C: AvailabilityChecker,
    S: OrderStore,
{
    pub fn new(checker: C, store: S) -> Self {
        Self { checker, store }
    }

    pub fn checker(&self) -> &C {
        &self.checker
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places an order.
    ///
    /// The checker is asked exactly once. The order is persisted only when it
    /// answers `false`; an answer of `true` rejects the request with
    /// [`OrderError::Rejected`] and writes nothing. This mirrors the
    /// production rule as deployed, which reads inverted against the
    /// rejection message. Flip the condition only together with the callers
    /// that depend on it.
    ///
    /// The availability check is never cut short here: its latency is bounded
    /// by the checker's own retry and timeout settings. Dropping the returned
    /// future before the store write starts persists nothing.
    #[tracing::instrument(
        skip(self, request),
        fields(sku_code = %request.sku_code, quantity = request.quantity)
    )]
    pub async fn place_order(&self, request: OrderRequest) -> Result<Order, OrderError> {
        let in_stock = self
            .checker
            .check_availability(&request.sku_code, request.quantity)
            .await;

        if in_stock {
            metrics::counter!("orders_rejected_total").increment(1);
            tracing::info!("order rejected");
            return Err(Rejection::new(request.sku_code).into());
        }

        let order = self.store.save(Order::from_request(request)).await?;

        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(order_number = %order.order_number, "order placed");
        Ok(order)
    }

    pub async fn get_order(&self, order_number: &OrderNumber) -> Result<Option<Order>, OrderError> {
        Ok(self.store.find(order_number).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use common::SkuCode;
    use rust_decimal::Decimal;

    use super::*;
    use crate::error::OrderStoreError;
    use crate::memory::InMemoryOrderStore;

    struct StubChecker {
        answer: bool,
        calls: AtomicU32,
    }

    impl StubChecker {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl AvailabilityChecker for StubChecker {
        async fn check_availability(&self, _sku_code: &SkuCode, _quantity: i32) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    /// Never answers.
    struct HangingChecker;

    #[async_trait]
    impl AvailabilityChecker for HangingChecker {
        async fn check_availability(&self, _sku_code: &SkuCode, _quantity: i32) -> bool {
            std::future::pending().await
        }
    }

    fn request() -> OrderRequest {
        OrderRequest::new("iphone_15", Decimal::new(99999, 2), 5)
    }

    #[tokio::test]
    async fn false_answer_persists_order() {
        let service = OrderService::new(StubChecker::answering(false), InMemoryOrderStore::new());

        let order = service.place_order(request()).await.unwrap();

        assert_eq!(order.sku_code.as_str(), "iphone_15");
        assert_eq!(order.price, Decimal::new(99999, 2));
        assert_eq!(order.quantity, 5);
        assert_eq!(service.store().count().await.unwrap(), 1);
        assert_eq!(
            service.get_order(&order.order_number).await.unwrap(),
            Some(order)
        );
        assert_eq!(service.checker().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn true_answer_rejects_without_writing() {
        let service = OrderService::new(StubChecker::answering(true), InMemoryOrderStore::new());

        let err = service.place_order(request()).await.unwrap_err();

        match err {
            OrderError::Rejected(rejection) => {
                assert_eq!(rejection.sku_code.as_str(), "iphone_15");
                assert_eq!(
                    rejection.to_string(),
                    "Product iphone_15 is not in stock, please try again later"
                );
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(service.store().count().await.unwrap(), 0);
        assert_eq!(service.checker().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_persistence_error() {
        let store = InMemoryOrderStore::new();
        store.set_fail_on_save(true).await;
        let service = OrderService::new(StubChecker::answering(false), store);

        let err = service.place_order(request()).await.unwrap_err();

        assert!(matches!(
            err,
            OrderError::Persistence(OrderStoreError::Unavailable(_))
        ));
        assert_eq!(service.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn caller_supplied_identifiers_are_ignored() {
        let service = OrderService::new(StubChecker::answering(false), InMemoryOrderStore::new());
        let mut req = request();
        req.id = Some(1);
        req.order_number = Some("ORD-1".to_string());

        let order = service.place_order(req).await.unwrap();
        assert_ne!(order.order_number.to_string(), "ORD-1");
    }

    #[tokio::test]
    async fn each_placement_gets_a_distinct_order_number() {
        let service = OrderService::new(StubChecker::answering(false), InMemoryOrderStore::new());

        let first = service.place_order(request()).await.unwrap();
        let second = service.place_order(request()).await.unwrap();

        assert_ne!(first.order_number, second.order_number);
        assert_eq!(service.store().count().await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_placement_writes_nothing() {
        let store = InMemoryOrderStore::new();
        let service = OrderService::new(HangingChecker, store.clone());

        let outcome = tokio::time::timeout(Duration::from_secs(1), service.place_order(request())).await;

        assert!(outcome.is_err());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
