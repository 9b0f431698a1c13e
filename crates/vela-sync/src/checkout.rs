//! # Checkout Dispatcher
//!
//! The `add_order` entry point the checkout screen calls. Dispatches a
//! frozen order to the online path or the offline pipeline - the visible
//! LOCAL effect is identical either way.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        add_order(order)                                 │
//! │                                                                         │
//! │  online?                                                                │
//! │   ├── yes → gateway.create_order                                        │
//! │   │          ├── accepted → local commit, queue step SKIPPED            │
//! │   │          └── failed   → fall through to the offline path            │
//! │   └── no  → local commit WITH queue entry (drained on reconnect)        │
//! │                                                                         │
//! │  Either branch: order history + stock decrement + audit log, in one     │
//! │  local transaction. A store failure propagates to the checkout UI and   │
//! │  the cart stays intact for retry.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tracing::{info, warn};

use vela_core::Order;
use vela_store::Store;

use crate::connection::ConnectionMonitor;
use crate::error::SyncResult;
use crate::gateway::RemoteGateway;

/// Order submission service for checkout.
pub struct OrderService {
    store: Store,
    gateway: Arc<dyn RemoteGateway>,
    connection: ConnectionMonitor,
}

impl OrderService {
    /// Creates the service.
    pub fn new(store: Store, gateway: Arc<dyn RemoteGateway>, connection: ConnectionMonitor) -> Self {
        OrderService {
            store,
            gateway,
            connection,
        }
    }

    /// Commits a checkout under any connectivity condition.
    ///
    /// Returns the committed order - the gateway's accepted version when
    /// online, the local version when offline or when the gateway
    /// refused (in which case the order is queued for reconciliation).
    pub async fn add_order(&self, order: Order) -> SyncResult<Order> {
        if self.connection.is_online() {
            match self.gateway.create_order(&order).await {
                Ok(accepted) => {
                    // Already server-side: commit locally without queuing.
                    self.store.pipeline().commit_order(&accepted, false).await?;
                    info!(order_id = %accepted.id, "Order accepted online");
                    return Ok(accepted);
                }
                Err(e) => {
                    warn!(
                        order_id = %order.id,
                        error = %e,
                        "Gateway refused order while online, committing offline"
                    );
                }
            }
        }

        self.store.pipeline().commit_order(&order, true).await?;
        info!(order_id = %order.id, "Order committed offline, queued for sync");
        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionState;
    use crate::testing::MockGateway;
    use chrono::Utc;
    use vela_core::{CartSession, Product, StateSnapshot, TaxRate};
    use vela_store::{Store, StoreConfig};

    fn product(stock: i64) -> Product {
        Product {
            id: "p1".to_string(),
            tenant_id: "tenant-1".to_string(),
            sku: "SKU-p1".to_string(),
            barcode: None,
            name: "Widget".to_string(),
            category_id: None,
            price_cents: 10_000,
            cost_cents: None,
            stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn setup(stock: i64) -> (Store, Product) {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let p = product(stock);
        store
            .cache_all(&StateSnapshot {
                products: Some(vec![p.clone()]),
                ..Default::default()
            })
            .await
            .unwrap();
        (store, p)
    }

    fn checkout(product: &Product) -> Order {
        let mut cart = CartSession::new();
        cart.add_product(product);
        cart.set_tax_rate(TaxRate::from_fraction(0.08));
        cart.build_order("tenant-1", "user-1").unwrap()
    }

    #[tokio::test]
    async fn test_online_checkout_skips_the_queue() {
        let (store, p) = setup(10).await;
        let gateway = Arc::new(MockGateway::new());
        let connection = ConnectionMonitor::new(ConnectionState::Online);

        let service = OrderService::new(store.clone(), gateway.clone(), connection);
        let committed = service.add_order(checkout(&p)).await.unwrap();

        // Gateway got the order; nothing pending; local effects applied.
        assert_eq!(gateway.created_ids(), vec![committed.id.clone()]);
        assert_eq!(store.pending_orders().count("tenant-1").await.unwrap(), 0);
        let local = store.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(local.stock, 9);
    }

    #[tokio::test]
    async fn test_offline_checkout_queues() {
        let (store, p) = setup(10).await;
        let gateway = Arc::new(MockGateway::new());
        let connection = ConnectionMonitor::new(ConnectionState::Offline);

        let service = OrderService::new(store.clone(), gateway.clone(), connection);
        let committed = service.add_order(checkout(&p)).await.unwrap();

        // No gateway call; queued; same local effects as online.
        assert!(gateway.created_ids().is_empty());
        let pending = store.pending_orders().list_pending("tenant-1").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].order_id, committed.id);
        let local = store.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(local.stock, 9);
    }

    #[tokio::test]
    async fn test_gateway_refusal_falls_back_to_offline_commit() {
        let (store, p) = setup(10).await;
        let gateway = Arc::new(MockGateway::new());
        let connection = ConnectionMonitor::new(ConnectionState::Online);

        let order = checkout(&p);
        gateway.fail_order(&order.id);

        let service = OrderService::new(store.clone(), gateway.clone(), connection);
        let committed = service.add_order(order).await.unwrap();

        // Queued despite being "online": the refusal is treated like an
        // offline commit and retried by the reconciler.
        let pending = store.pending_orders().list_pending("tenant-1").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].order_id, committed.id);
    }
}
