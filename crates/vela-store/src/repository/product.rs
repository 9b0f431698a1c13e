//! # Product Repository
//!
//! Read/write access to the tenant-scoped product cache.
//!
//! ## Offline Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier types: "cok"                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LOWER(name) LIKE '%cok%' OR LOWER(sku) LIKE '%cok%'                    │
//! │       │               (tenant-scoped, local only - works offline)       │
//! │       ▼                                                                 │
//! │  [COKE-330 "Coca-Cola 330ml", COKE-500 "Coca-Cola 500ml"]               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use vela_core::Product;

use crate::cache;
use crate::error::StoreResult;

/// Repository for product cache operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its SKU within a tenant.
    pub async fn get_by_sku(&self, tenant_id: &str, sku: &str) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as("SELECT * FROM products WHERE tenant_id = ?1 AND sku = ?2")
            .bind(tenant_id)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists a tenant's active products, sorted by name.
    pub async fn list_for_tenant(&self, tenant_id: &str) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as(
            "SELECT * FROM products WHERE tenant_id = ?1 AND is_active = 1 ORDER BY name",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Case-insensitive substring search across product name and SKU,
    /// scoped to one tenant, without contacting the network.
    ///
    /// An empty query lists all active products.
    pub async fn search(&self, tenant_id: &str, query: &str) -> StoreResult<Vec<Product>> {
        let query = query.trim();

        debug!(tenant_id = %tenant_id, query = %query, "Searching product cache");

        if query.is_empty() {
            return self.list_for_tenant(tenant_id).await;
        }

        let products = sqlx::query_as(
            r#"
            SELECT * FROM products
            WHERE tenant_id = ?1
              AND is_active = 1
              AND (LOWER(name) LIKE '%' || LOWER(?2) || '%'
                   OR LOWER(sku) LIKE '%' || LOWER(?2) || '%')
            ORDER BY name
            "#,
        )
        .bind(tenant_id)
        .bind(query)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Upserts a cached product row.
    pub async fn upsert(&self, product: &Product) -> StoreResult<()> {
        debug!(sku = %product.sku, "Upserting product");

        let mut conn = self.pool.acquire().await?;
        cache::upsert_product(&mut conn, product).await
    }

    /// Counts a tenant's active products (for diagnostics).
    pub async fn count_for_tenant(&self, tenant_id: &str) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE tenant_id = ?1 AND is_active = 1",
        )
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Store, StoreConfig};
    use chrono::Utc;
    use vela_core::Product;

    fn product(id: &str, sku: &str, name: &str) -> Product {
        Product {
            id: id.to_string(),
            tenant_id: "tenant-1".to_string(),
            sku: sku.to_string(),
            barcode: None,
            name: name.to_string(),
            category_id: None,
            price_cents: 299,
            cost_cents: None,
            stock: 10,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn seeded_store() -> Store {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let repo = store.products();

        repo.upsert(&product("p1", "COKE-330", "Coca-Cola 330ml"))
            .await
            .unwrap();
        repo.upsert(&product("p2", "COKE-500", "Coca-Cola 500ml"))
            .await
            .unwrap();
        repo.upsert(&product("p3", "PEPSI-330", "Pepsi 330ml"))
            .await
            .unwrap();

        store
    }

    #[tokio::test]
    async fn test_search_matches_name_and_sku_case_insensitively() {
        let store = seeded_store().await;

        let by_name = store.products().search("tenant-1", "cOcA").await.unwrap();
        assert_eq!(by_name.len(), 2);

        let by_sku = store.products().search("tenant-1", "pepsi-3").await.unwrap();
        assert_eq!(by_sku.len(), 1);
        assert_eq!(by_sku[0].id, "p3");

        let none = store.products().search("tenant-1", "fanta").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_lists_all_active() {
        let store = seeded_store().await;

        let all = store.products().search("tenant-1", "  ").await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_search_is_tenant_scoped() {
        let store = seeded_store().await;

        let foreign = store.products().search("tenant-2", "coke").await.unwrap();
        assert!(foreign.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_sku() {
        let store = seeded_store().await;

        let found = store
            .products()
            .get_by_sku("tenant-1", "COKE-330")
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, "p1");

        let missing = store
            .products()
            .get_by_sku("tenant-1", "MISSING")
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
