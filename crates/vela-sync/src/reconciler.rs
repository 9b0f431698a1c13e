//! # Sync Reconciler
//!
//! Converges local optimistic state with the Remote Data Gateway.
//!
//! ## Drain Then Refresh
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          sync_now()                                     │
//! │                                                                         │
//! │  1. list pending_orders (FIFO by queued_at)                             │
//! │     └── empty? return immediately (no-op, no refresh)                   │
//! │                                                                         │
//! │  2. for each entry, in enqueue order:                                   │
//! │       gateway.create_order(order)                                       │
//! │         ├── Ok  → DELETE queue entry (only after the ack)               │
//! │         └── Err → record attempt + error, KEEP entry, continue with     │
//! │                   the next one (per-item isolation)                     │
//! │                                                                         │
//! │  3. full refresh: fetch_state(tenant) → cache_all (server wins)         │
//! │     Local optimistic mutations not captured by the queue - e.g. a       │
//! │     stock edit from another device - are discarded for fetched truth.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Delivery is at-least-once: if the gateway accepts an order but the
//! local dequeue fails before acknowledging, the same order is resubmitted
//! on the next sync. Dedupe by order id is the GATEWAY's responsibility.

use std::sync::Arc;
use tracing::{debug, info, warn};

use vela_core::Order;
use vela_store::Store;

use crate::error::SyncResult;
use crate::gateway::RemoteGateway;

/// Submission attempts after which an entry is skipped for the round.
///
/// Skipped entries stay queued - they are surfaced to support, never
/// silently deleted.
const MAX_SYNC_ATTEMPTS: i64 = 10;

// =============================================================================
// Sync Report
// =============================================================================

/// Summary of one reconciliation round, for status surfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Orders accepted by the gateway and dequeued.
    pub pushed: usize,

    /// Orders whose submission failed; retained for the next round.
    pub failed: usize,

    /// Orders skipped for exceeding the attempt ceiling.
    pub skipped: usize,

    /// Whether the server-wins refresh ran.
    pub refreshed: bool,
}

// =============================================================================
// Reconciler
// =============================================================================

/// Drains the pending-order queue and refreshes the local cache.
///
/// The reconciler is the ONLY component that deletes pending-queue
/// entries.
pub struct Reconciler {
    store: Store,
    gateway: Arc<dyn RemoteGateway>,
    tenant_id: String,
}

impl Reconciler {
    /// Creates a reconciler for one tenant.
    pub fn new(store: Store, gateway: Arc<dyn RemoteGateway>, tenant_id: impl Into<String>) -> Self {
        Reconciler {
            store,
            gateway,
            tenant_id: tenant_id.into(),
        }
    }

    /// Runs one reconciliation round. See the module docs for the
    /// algorithm; returns what happened.
    pub async fn sync_now(&self) -> SyncResult<SyncReport> {
        let pending = self.store.pending_orders().list_pending(&self.tenant_id).await?;

        if pending.is_empty() {
            debug!("No pending orders, sync is a no-op");
            return Ok(SyncReport::default());
        }

        info!(count = pending.len(), "Draining pending-order queue");

        let mut report = SyncReport::default();

        for entry in pending {
            if entry.attempts >= MAX_SYNC_ATTEMPTS {
                warn!(
                    order_id = %entry.order_id,
                    attempts = entry.attempts,
                    "Skipping entry that exceeded max sync attempts"
                );
                report.skipped += 1;
                continue;
            }

            let order: Order = match serde_json::from_str(&entry.payload) {
                Ok(order) => order,
                Err(e) => {
                    warn!(order_id = %entry.order_id, error = %e, "Undecodable queued payload");
                    self.store
                        .pending_orders()
                        .mark_failed(&entry.order_id, &e.to_string())
                        .await?;
                    report.failed += 1;
                    continue;
                }
            };

            match self.gateway.create_order(&order).await {
                Ok(_) => {
                    // Dequeue strictly AFTER the gateway ack.
                    self.store.pending_orders().remove(&entry.order_id).await?;
                    report.pushed += 1;
                    debug!(order_id = %entry.order_id, "Pending order accepted by gateway");
                }
                Err(e) => {
                    // One failure must not stall the entries behind it.
                    warn!(
                        order_id = %entry.order_id,
                        error = %e,
                        retryable = e.is_retryable(),
                        "Pending order submission failed, keeping it queued"
                    );
                    self.store
                        .pending_orders()
                        .mark_failed(&entry.order_id, &e.to_string())
                        .await?;
                    report.failed += 1;
                }
            }
        }

        // Server wins: overwrite local caches with fetched truth, even
        // after a partial drain.
        let snapshot = self.gateway.fetch_state(&self.tenant_id).await?;
        self.store.cache_all(&snapshot).await?;
        report.refreshed = true;

        info!(
            pushed = report.pushed,
            failed = report.failed,
            skipped = report.skipped,
            "Sync round complete"
        );

        Ok(report)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGateway;
    use chrono::Utc;
    use tokio::time::{sleep, Duration};
    use vela_core::{CartSession, Product, StateSnapshot};
    use vela_store::{Store, StoreConfig};

    fn product(id: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            tenant_id: "tenant-1".to_string(),
            sku: format!("SKU-{}", id),
            barcode: None,
            name: format!("Product {}", id),
            category_id: None,
            price_cents: 1_000,
            cost_cents: None,
            stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn store_with_product(stock: i64) -> (Store, Product) {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let p = product("p1", stock);
        store
            .cache_all(&StateSnapshot {
                products: Some(vec![p.clone()]),
                ..Default::default()
            })
            .await
            .unwrap();
        (store, p)
    }

    async fn commit_offline_order(store: &Store, product: &Product) -> String {
        let mut cart = CartSession::new();
        cart.add_product(product);
        let order = cart.build_order("tenant-1", "user-1").unwrap();
        store.pipeline().commit_order(&order, true).await.unwrap();
        order.id
    }

    #[tokio::test]
    async fn test_empty_queue_is_a_noop() {
        let (store, _) = store_with_product(10).await;
        let gateway = Arc::new(MockGateway::new());
        let reconciler = Reconciler::new(store, gateway.clone(), "tenant-1");

        let report = reconciler.sync_now().await.unwrap();

        assert_eq!(report, SyncReport::default());
        assert!(!report.refreshed);
        assert_eq!(gateway.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_drain_submits_fifo_then_refreshes_server_wins() {
        let (store, p) = store_with_product(10).await;

        let first = commit_offline_order(&store, &p).await;
        // Keep queued_at strictly increasing so FIFO order is unambiguous.
        sleep(Duration::from_millis(5)).await;
        let second = commit_offline_order(&store, &p).await;

        let gateway = Arc::new(MockGateway::new());
        // The gateway's authoritative stock differs from the local
        // optimistic number (another terminal sold units meanwhile).
        gateway.set_products(vec![product("p1", 42)]);

        let reconciler = Reconciler::new(store.clone(), gateway.clone(), "tenant-1");
        let report = reconciler.sync_now().await.unwrap();

        assert_eq!(report.pushed, 2);
        assert_eq!(report.failed, 0);
        assert!(report.refreshed);

        // FIFO submission order.
        assert_eq!(gateway.created_ids(), vec![first, second]);

        // Queue is empty and the gateway's stock number won.
        assert_eq!(store.pending_orders().count("tenant-1").await.unwrap(), 0);
        let local = store.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(local.stock, 42);
    }

    #[tokio::test]
    async fn test_failed_entry_is_retained_and_does_not_block_the_rest() {
        let (store, p) = store_with_product(10).await;

        let first = commit_offline_order(&store, &p).await;
        sleep(Duration::from_millis(5)).await;
        let second = commit_offline_order(&store, &p).await;
        sleep(Duration::from_millis(5)).await;
        let third = commit_offline_order(&store, &p).await;

        let gateway = Arc::new(MockGateway::new());
        gateway.set_products(vec![product("p1", 7)]);
        gateway.fail_order(&second);

        let reconciler = Reconciler::new(store.clone(), gateway.clone(), "tenant-1");
        let report = reconciler.sync_now().await.unwrap();

        assert_eq!(report.pushed, 2);
        assert_eq!(report.failed, 1);
        assert!(report.refreshed); // partial drain still refreshes

        assert_eq!(gateway.created_ids(), vec![first, third]);

        // The failed entry stays queued with its bookkeeping updated.
        let pending = store.pending_orders().list_pending("tenant-1").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].order_id, second);
        assert_eq!(pending[0].attempts, 1);
        assert!(pending[0].last_error.as_deref().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_retry_after_outage_converges() {
        let (store, p) = store_with_product(10).await;
        let order_id = commit_offline_order(&store, &p).await;

        let gateway = Arc::new(MockGateway::new());
        gateway.set_products(vec![product("p1", 9)]);
        gateway.fail_order(&order_id);

        let reconciler = Reconciler::new(store.clone(), gateway.clone(), "tenant-1");

        let first_round = reconciler.sync_now().await.unwrap();
        assert_eq!(first_round.pushed, 0);
        assert_eq!(first_round.failed, 1);

        // Outage over.
        gateway.fail_ids.lock().unwrap().clear();

        let second_round = reconciler.sync_now().await.unwrap();
        assert_eq!(second_round.pushed, 1);
        assert_eq!(store.pending_orders().count("tenant-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_entries_past_attempt_ceiling_are_skipped_not_deleted() {
        let (store, p) = store_with_product(10).await;
        let order_id = commit_offline_order(&store, &p).await;

        for _ in 0..MAX_SYNC_ATTEMPTS {
            store
                .pending_orders()
                .mark_failed(&order_id, "simulated")
                .await
                .unwrap();
        }

        let gateway = Arc::new(MockGateway::new());
        gateway.set_products(vec![product("p1", 10)]);

        let reconciler = Reconciler::new(store.clone(), gateway.clone(), "tenant-1");
        let report = reconciler.sync_now().await.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.pushed, 0);
        assert!(gateway.created_ids().is_empty());

        // Still queued for support to inspect.
        assert_eq!(store.pending_orders().count("tenant-1").await.unwrap(), 1);
    }
}
