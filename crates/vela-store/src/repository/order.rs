//! # Order Repository
//!
//! Read access to local order history. Writes go through the offline
//! order pipeline (`OrderPipeline::commit_order`) so an order row can
//! never appear without its stock and audit effects.

use sqlx::SqlitePool;

use vela_core::{Order, OrderItem, OrderStatus};

use crate::error::StoreResult;

/// Repository for order history.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID, with its line items attached.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Order>> {
        let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(mut order) = order else {
            return Ok(None);
        };

        order.items = self.items_for(&order.id).await?;
        Ok(Some(order))
    }

    /// Lists a tenant's orders newest-first, with line items attached.
    pub async fn list_for_tenant(&self, tenant_id: &str) -> StoreResult<Vec<Order>> {
        let mut orders: Vec<Order> =
            sqlx::query_as("SELECT * FROM orders WHERE tenant_id = ?1 ORDER BY created_at DESC")
                .bind(tenant_id)
                .fetch_all(&self.pool)
                .await?;

        for order in &mut orders {
            order.items = self.items_for(&order.id).await?;
        }

        Ok(orders)
    }

    /// Lists a tenant's orders in one status, newest-first (no items -
    /// the status screens only render header rows).
    pub async fn list_by_status(
        &self,
        tenant_id: &str,
        status: OrderStatus,
    ) -> StoreResult<Vec<Order>> {
        let orders = sqlx::query_as(
            "SELECT * FROM orders WHERE tenant_id = ?1 AND status = ?2 ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Counts a tenant's orders.
    pub async fn count_for_tenant(&self, tenant_id: &str) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE tenant_id = ?1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn items_for(&self, order_id: &str) -> StoreResult<Vec<OrderItem>> {
        let items = sqlx::query_as(
            "SELECT * FROM order_items WHERE order_id = ?1 ORDER BY created_at",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}
