//! # Stock Log Repository
//!
//! Append-only access to the inventory audit trail. Entries are created
//! by the order pipeline (one per product line per committed order) and
//! by gateway refreshes; nothing ever updates or deletes them.

use sqlx::SqlitePool;
use tracing::debug;

use vela_core::StockLogEntry;

use crate::cache;
use crate::error::StoreResult;

/// Repository for the stock movement log.
#[derive(Debug, Clone)]
pub struct StockLogRepository {
    pool: SqlitePool,
}

impl StockLogRepository {
    /// Creates a new StockLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockLogRepository { pool }
    }

    /// Appends an entry. Ignores an id that already exists (append-only).
    pub async fn append(&self, entry: &StockLogEntry) -> StoreResult<()> {
        debug!(
            product_id = %entry.product_id,
            delta = entry.delta,
            resulting_stock = entry.resulting_stock,
            "Appending stock log entry"
        );

        let mut conn = self.pool.acquire().await?;
        cache::insert_stock_log(&mut conn, entry).await
    }

    /// Lists a tenant's entries newest-first.
    pub async fn list_for_tenant(&self, tenant_id: &str) -> StoreResult<Vec<StockLogEntry>> {
        let entries = sqlx::query_as(
            "SELECT * FROM stock_logs WHERE tenant_id = ?1 ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Lists one product's movement history newest-first.
    pub async fn list_for_product(&self, product_id: &str) -> StoreResult<Vec<StockLogEntry>> {
        let entries = sqlx::query_as(
            "SELECT * FROM stock_logs WHERE product_id = ?1 ORDER BY created_at DESC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
