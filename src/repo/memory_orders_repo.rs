use crate::domain::order::{MarkPaidFields, Order};
use crate::repo::orders_repo::OrderStore;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Order store held in process memory. The write lock spans the paid check
/// and the update, which gives the same compare-and-set guarantee as the
/// Postgres adapter.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, Order>>>,
    paid_writes: Arc<AtomicUsize>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, order: Order) {
        self.orders.write().await.insert(order.id.clone(), order);
    }

    pub async fn get(&self, order_id: &str) -> Option<Order> {
        self.orders.read().await.get(order_id).cloned()
    }

    /// Number of conditional writes that actually applied.
    pub fn paid_writes(&self) -> usize {
        self.paid_writes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn find_by_id(&self, order_id: &str) -> Result<Option<Order>> {
        Ok(self.get(order_id).await)
    }

    async fn conditional_mark_paid(
        &self,
        order_id: &str,
        fields: MarkPaidFields,
    ) -> Result<Option<Order>> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(order_id).filter(|o| !o.is_paid) else {
            return Ok(None);
        };

        order.is_paid = true;
        order.paid_at = Some(fields.paid_at);
        order.payment_result = Some(fields.payment_result);
        self.paid_writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(order.clone()))
    }
}
