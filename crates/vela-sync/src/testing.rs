//! Test doubles shared by the crate's test modules.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use vela_core::{Order, Product, StockLogEntry};

use crate::error::{SyncError, SyncResult};
use crate::gateway::RemoteGateway;

/// In-memory gateway with programmable failures.
#[derive(Default)]
pub(crate) struct MockGateway {
    /// Orders accepted, in submission order.
    pub created: Mutex<Vec<Order>>,

    /// Order ids whose submission should fail.
    pub fail_ids: Mutex<HashSet<String>>,

    /// Authoritative catalog returned by fetches.
    pub products: Mutex<Vec<Product>>,

    /// Number of full-state fetches served.
    pub fetches: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        MockGateway::default()
    }

    pub fn fail_order(&self, order_id: &str) {
        self.fail_ids.lock().unwrap().insert(order_id.to_string());
    }

    pub fn set_products(&self, products: Vec<Product>) {
        *self.products.lock().unwrap() = products;
    }

    pub fn created_ids(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.id.clone())
            .collect()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    async fn create_order(&self, order: &Order) -> SyncResult<Order> {
        if self.fail_ids.lock().unwrap().contains(&order.id) {
            return Err(SyncError::GatewayStatus {
                status: 503,
                message: "simulated outage".into(),
            });
        }

        self.created.lock().unwrap().push(order.clone());
        Ok(order.clone())
    }

    async fn products(&self, _tenant_id: &str) -> SyncResult<Vec<Product>> {
        Ok(self.products.lock().unwrap().clone())
    }

    async fn orders(&self, _tenant_id: &str) -> SyncResult<Vec<Order>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.created.lock().unwrap().clone())
    }

    async fn stock_logs(&self, _tenant_id: &str) -> SyncResult<Vec<StockLogEntry>> {
        Ok(Vec::new())
    }
}
