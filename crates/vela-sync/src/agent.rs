//! # Sync Agent
//!
//! Background task that triggers reconciliation at the right moments:
//! application startup (when online) and every offline→online transition.
//! There is no periodic sync - reconciliation is purely event-driven.
//!
//! ## Agent Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           SyncAgent::run                                │
//! │                                                                         │
//! │  startup: online? ──► reconciler.sync_now()                             │
//! │                                                                         │
//! │  loop {                                                                 │
//! │    select! {                                                            │
//! │      connectivity changed ─► was Offline, now Online?                   │
//! │                                 └─► reconciler.sync_now()               │
//! │      shutdown signal      ─► break                                      │
//! │    }                                                                    │
//! │  }                                                                      │
//! │                                                                         │
//! │  sync_now errors are logged here, never propagated: nothing             │
//! │  synchronous waits on background sync.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::{error, info};

use crate::connection::{ConnectionMonitor, ConnectionState};
use crate::error::{SyncError, SyncResult};
use crate::reconciler::{Reconciler, SyncReport};

// =============================================================================
// Agent Handle
// =============================================================================

/// Handle for controlling a running sync agent.
#[derive(Clone)]
pub struct SyncAgentHandle {
    reconciler: Arc<Reconciler>,
    shutdown_tx: mpsc::Sender<()>,
}

impl SyncAgentHandle {
    /// Manually triggers one reconciliation round (the console's
    /// "sync now" button). Unlike the background triggers, the result is
    /// returned to the caller.
    pub async fn sync_now(&self) -> SyncResult<SyncReport> {
        self.reconciler.sync_now().await
    }

    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> SyncResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| SyncError::ChannelError("Shutdown channel closed".into()))
    }
}

// =============================================================================
// Sync Agent
// =============================================================================

/// Event-driven reconciliation trigger.
pub struct SyncAgent {
    reconciler: Arc<Reconciler>,
    state_rx: watch::Receiver<ConnectionState>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl SyncAgent {
    /// Creates an agent and its control handle.
    pub fn new(reconciler: Reconciler, connection: &ConnectionMonitor) -> (Self, SyncAgentHandle) {
        let reconciler = Arc::new(reconciler);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let agent = SyncAgent {
            reconciler: reconciler.clone(),
            state_rx: connection.subscribe(),
            shutdown_rx,
        };

        let handle = SyncAgentHandle {
            reconciler,
            shutdown_tx,
        };

        (agent, handle)
    }

    /// Runs the agent loop. Spawn as a background task.
    pub async fn run(mut self) {
        info!("Sync agent starting");

        let mut last_state = *self.state_rx.borrow_and_update();

        // Startup trigger: drain whatever queued up while the app was
        // closed, if we already have connectivity.
        if last_state.is_online() {
            self.drain().await;
        }

        loop {
            tokio::select! {
                changed = self.state_rx.changed() => {
                    if changed.is_err() {
                        // Monitor dropped; nothing left to react to.
                        break;
                    }

                    let state = *self.state_rx.borrow_and_update();
                    if last_state == ConnectionState::Offline && state == ConnectionState::Online {
                        info!("Connectivity restored, reconciling");
                        self.drain().await;
                    }
                    last_state = state;
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Sync agent shutting down");
                    break;
                }
            }
        }

        info!("Sync agent stopped");
    }

    /// Runs one round, logging failures instead of propagating them.
    async fn drain(&self) {
        match self.reconciler.sync_now().await {
            Ok(report) => {
                if report.refreshed {
                    info!(
                        pushed = report.pushed,
                        failed = report.failed,
                        skipped = report.skipped,
                        "Background sync complete"
                    );
                }
            }
            Err(e) => {
                error!(error = %e, "Background sync failed");
            }
        }
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

    fn product(stock: i64) -> Product {
        Product {
            id: "p1".to_string(),
            tenant_id: "tenant-1".to_string(),
            sku: "SKU-p1".to_string(),
            barcode: None,
            name: "Widget".to_string(),
            category_id: None,
            price_cents: 2_500,
            cost_cents: None,
            stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn wait_until_drained(store: &Store) {
        for _ in 0..100 {
            if store.pending_orders().count("tenant-1").await.unwrap() == 0 {
                return;
            }
            sleep(Duration::from_millis(20)).await;
        }
        panic!("Pending queue was never drained");
    }

    #[tokio::test]
    async fn test_offline_commit_then_reconnect_drains_queue() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let p = product(10);
        store
            .cache_all(&StateSnapshot {
                products: Some(vec![p.clone()]),
                ..Default::default()
            })
            .await
            .unwrap();

        // Commit one order while offline.
        let mut cart = CartSession::new();
        cart.add_product(&p);
        let order = cart.build_order("tenant-1", "user-1").unwrap();
        store.pipeline().commit_order(&order, true).await.unwrap();
        assert_eq!(store.pending_orders().count("tenant-1").await.unwrap(), 1);
        // Optimistic local decrement happened.
        assert_eq!(
            store.products().get_by_id("p1").await.unwrap().unwrap().stock,
            9
        );

        let gateway = Arc::new(MockGateway::new());
        gateway.set_products(vec![product(6)]); // authoritative number

        let connection = ConnectionMonitor::new(ConnectionState::Offline);
        let reconciler = Reconciler::new(store.clone(), gateway.clone(), "tenant-1");
        let (agent, handle) = SyncAgent::new(reconciler, &connection);
        tokio::spawn(agent.run());

        // Browser fires its online event.
        connection.set_online();

        wait_until_drained(&store).await;

        // Exactly one create-order call.
        assert_eq!(gateway.created_ids(), vec![order.id]);

        // The dequeue precedes the refresh, so poll until the gateway's
        // authoritative stock number lands.
        let mut refreshed_stock = 9;
        for _ in 0..100 {
            refreshed_stock = store.products().get_by_id("p1").await.unwrap().unwrap().stock;
            if refreshed_stock == 6 {
                break;
            }
            sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(refreshed_stock, 6);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_startup_drain_when_already_online() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let p = product(10);
        store
            .cache_all(&StateSnapshot {
                products: Some(vec![p.clone()]),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut cart = CartSession::new();
        cart.add_product(&p);
        let order = cart.build_order("tenant-1", "user-1").unwrap();
        store.pipeline().commit_order(&order, true).await.unwrap();

        let gateway = Arc::new(MockGateway::new());
        gateway.set_products(vec![product(9)]);

        // Already online at startup: the agent drains without any event.
        let connection = ConnectionMonitor::new(ConnectionState::Online);
        let reconciler = Reconciler::new(store.clone(), gateway.clone(), "tenant-1");
        let (agent, handle) = SyncAgent::new(reconciler, &connection);
        tokio::spawn(agent.run());

        wait_until_drained(&store).await;
        assert_eq!(gateway.created_ids().len(), 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_manual_sync_now_via_handle() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let gateway = Arc::new(MockGateway::new());
        let connection = ConnectionMonitor::new(ConnectionState::Offline);
        let reconciler = Reconciler::new(store.clone(), gateway, "tenant-1");
        let (_agent, handle) = SyncAgent::new(reconciler, &connection);

        // Empty queue: explicit no-op report.
        let report = handle.sync_now().await.unwrap();
        assert_eq!(report, SyncReport::default());
    }
}
