//! # Pending Order Queue Repository
//!
//! The local record of orders committed offline but not yet acknowledged
//! by the Remote Data Gateway.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       pending_orders Table                              │
//! │                                                                         │
//! │  WRITES (enqueue)   : offline order pipeline, same transaction as       │
//! │                       the order itself                                  │
//! │  DELETES (remove)   : sync reconciler ONLY, after gateway ack           │
//! │  UPDATES (failures) : sync reconciler ONLY (attempts, last_error)       │
//! │                                                                         │
//! │  Drain order is FIFO by queued_at: the gateway's stock numbers are      │
//! │  path-dependent on order application order.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use vela_core::PendingOrder;

use crate::error::StoreResult;

/// Repository for the pending-sync queue.
#[derive(Debug, Clone)]
pub struct PendingOrderRepository {
    pool: SqlitePool,
}

impl PendingOrderRepository {
    /// Creates a new PendingOrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PendingOrderRepository { pool }
    }

    /// Lists a tenant's pending entries in enqueue (FIFO) order.
    pub async fn list_pending(&self, tenant_id: &str) -> StoreResult<Vec<PendingOrder>> {
        let entries = sqlx::query_as(
            "SELECT * FROM pending_orders WHERE tenant_id = ?1 ORDER BY queued_at ASC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Removes an acknowledged entry. Reconciler-only.
    pub async fn remove(&self, order_id: &str) -> StoreResult<()> {
        debug!(order_id = %order_id, "Removing acknowledged pending order");

        sqlx::query("DELETE FROM pending_orders WHERE order_id = ?1")
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Records a failed submission attempt; the entry stays queued for
    /// the next sync.
    pub async fn mark_failed(&self, order_id: &str, error: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE pending_orders SET
                attempts = attempts + 1,
                last_error = ?2
            WHERE order_id = ?1
            "#,
        )
        .bind(order_id)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts a tenant's pending entries.
    pub async fn count(&self, tenant_id: &str) -> StoreResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pending_orders WHERE tenant_id = ?1")
                .bind(tenant_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
