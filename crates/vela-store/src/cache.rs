//! # Tenant Cache
//!
//! The bulk cache writer and tenant state loader.
//!
//! ## Write Path: One Transaction, All Tables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      cache_all(snapshot)                                │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    upsert products?   ──┐                                               │
//! │    upsert categories? ──┤  only collections present in the snapshot     │
//! │    upsert orders?     ──┤  are touched; each row is an                  │
//! │    ...                ──┘  INSERT .. ON CONFLICT DO UPDATE              │
//! │  COMMIT ← all tables or none                                            │
//! │                                                                         │
//! │  A failed bulk write can never leave orders written but products not:   │
//! │  mixed old/new state across tables is impossible by construction.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The per-entity upsert helpers take a `&mut SqliteConnection` so the
//! offline order pipeline and the repositories reuse the exact same SQL
//! inside their own transactions.

use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use vela_core::{
    Category, Customer, Expense, LocalState, Notification, Order, OrderItem, Product,
    PurchaseOrder, StateSnapshot, StockLogEntry, Supplier, Tenant, TenantSettings, User,
};

use crate::error::StoreResult;

// =============================================================================
// Bulk Write
// =============================================================================

/// Bulk-upserts every collection present in `snapshot`, atomically.
pub(crate) async fn cache_all(pool: &SqlitePool, snapshot: &StateSnapshot) -> StoreResult<()> {
    if snapshot.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    if let Some(products) = &snapshot.products {
        for product in products {
            upsert_product(&mut tx, product).await?;
        }
    }
    if let Some(categories) = &snapshot.categories {
        for category in categories {
            upsert_category(&mut tx, category).await?;
        }
    }
    if let Some(orders) = &snapshot.orders {
        for order in orders {
            upsert_order(&mut tx, order).await?;
        }
    }
    if let Some(customers) = &snapshot.customers {
        for customer in customers {
            upsert_customer(&mut tx, customer).await?;
        }
    }
    if let Some(suppliers) = &snapshot.suppliers {
        for supplier in suppliers {
            upsert_supplier(&mut tx, supplier).await?;
        }
    }
    if let Some(stock_logs) = &snapshot.stock_logs {
        for entry in stock_logs {
            insert_stock_log(&mut tx, entry).await?;
        }
    }
    if let Some(purchase_orders) = &snapshot.purchase_orders {
        for po in purchase_orders {
            upsert_purchase_order(&mut tx, po).await?;
        }
    }
    if let Some(expenses) = &snapshot.expenses {
        for expense in expenses {
            upsert_expense(&mut tx, expense).await?;
        }
    }
    if let Some(notifications) = &snapshot.notifications {
        for notification in notifications {
            upsert_notification(&mut tx, notification).await?;
        }
    }
    if let Some(settings) = &snapshot.settings {
        for entry in settings {
            upsert_settings(&mut tx, entry).await?;
        }
    }
    if let Some(users) = &snapshot.users {
        for user in users {
            upsert_user(&mut tx, user).await?;
        }
    }
    if let Some(tenants) = &snapshot.tenants {
        for tenant in tenants {
            upsert_tenant(&mut tx, tenant).await?;
        }
    }

    tx.commit().await?;

    debug!("Cache write committed");
    Ok(())
}

// =============================================================================
// Tenant State Load
// =============================================================================

/// Loads every entity collection for one tenant.
pub(crate) async fn load_local_state(
    pool: &SqlitePool,
    tenant_id: &str,
) -> StoreResult<LocalState> {
    let products: Vec<Product> =
        sqlx::query_as("SELECT * FROM products WHERE tenant_id = ?1 ORDER BY name")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;

    let categories: Vec<Category> =
        sqlx::query_as("SELECT * FROM categories WHERE tenant_id = ?1 ORDER BY name")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;

    let mut orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE tenant_id = ?1 ORDER BY created_at DESC")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;

    // Attach line items, one query for the whole tenant.
    let items: Vec<OrderItem> = sqlx::query_as(
        r#"
        SELECT oi.*
        FROM order_items oi
        INNER JOIN orders o ON o.id = oi.order_id
        WHERE o.tenant_id = ?1
        ORDER BY oi.created_at
        "#,
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    let mut by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id.clone()).or_default().push(item);
    }
    for order in &mut orders {
        if let Some(items) = by_order.remove(&order.id) {
            order.items = items;
        }
    }

    let customers: Vec<Customer> =
        sqlx::query_as("SELECT * FROM customers WHERE tenant_id = ?1 ORDER BY name")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;

    let suppliers: Vec<Supplier> =
        sqlx::query_as("SELECT * FROM suppliers WHERE tenant_id = ?1 ORDER BY name")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;

    let stock_logs: Vec<StockLogEntry> =
        sqlx::query_as("SELECT * FROM stock_logs WHERE tenant_id = ?1 ORDER BY created_at DESC")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;

    let purchase_orders: Vec<PurchaseOrder> = sqlx::query_as(
        "SELECT * FROM purchase_orders WHERE tenant_id = ?1 ORDER BY created_at DESC",
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    let expenses: Vec<Expense> =
        sqlx::query_as("SELECT * FROM expenses WHERE tenant_id = ?1 ORDER BY date DESC")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;

    let notifications: Vec<Notification> =
        sqlx::query_as("SELECT * FROM notifications WHERE tenant_id = ?1 ORDER BY created_at DESC")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;

    let settings: Vec<TenantSettings> =
        sqlx::query_as("SELECT * FROM settings WHERE tenant_id = ?1")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;

    let users: Vec<User> =
        sqlx::query_as("SELECT * FROM users WHERE tenant_id = ?1 ORDER BY name")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;

    let tenants: Vec<Tenant> = sqlx::query_as("SELECT * FROM tenants WHERE id = ?1")
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;

    Ok(LocalState {
        products,
        categories,
        orders,
        customers,
        suppliers,
        stock_logs,
        purchase_orders,
        expenses,
        notifications,
        settings,
        users,
        tenants,
    })
}

// =============================================================================
// Per-Entity Upserts
// =============================================================================
// Shared by cache_all, the repositories and the order pipeline; each takes
// a plain connection so callers control the enclosing transaction.

pub(crate) async fn upsert_product(
    conn: &mut SqliteConnection,
    product: &Product,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO products (
            id, tenant_id, sku, barcode, name, category_id,
            price_cents, cost_cents, stock, is_active, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(id) DO UPDATE SET
            tenant_id = excluded.tenant_id,
            sku = excluded.sku,
            barcode = excluded.barcode,
            name = excluded.name,
            category_id = excluded.category_id,
            price_cents = excluded.price_cents,
            cost_cents = excluded.cost_cents,
            stock = excluded.stock,
            is_active = excluded.is_active,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&product.id)
    .bind(&product.tenant_id)
    .bind(&product.sku)
    .bind(&product.barcode)
    .bind(&product.name)
    .bind(&product.category_id)
    .bind(product.price_cents)
    .bind(product.cost_cents)
    .bind(product.stock)
    .bind(product.is_active)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Upserts the order row and replaces its line items.
///
/// Item replacement (delete + insert) keeps the upsert idempotent: a
/// re-commit of the same order id cannot duplicate its items.
pub(crate) async fn upsert_order(conn: &mut SqliteConnection, order: &Order) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, tenant_id, user_id, salesperson_id, salesperson_name,
            customer_id, customer_name, status,
            subtotal_cents, discount_cents, discount_type, tax_cents, total_cents,
            is_return, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        ON CONFLICT(id) DO UPDATE SET
            status = excluded.status,
            subtotal_cents = excluded.subtotal_cents,
            discount_cents = excluded.discount_cents,
            discount_type = excluded.discount_type,
            tax_cents = excluded.tax_cents,
            total_cents = excluded.total_cents,
            is_return = excluded.is_return
        "#,
    )
    .bind(&order.id)
    .bind(&order.tenant_id)
    .bind(&order.user_id)
    .bind(&order.salesperson_id)
    .bind(&order.salesperson_name)
    .bind(&order.customer_id)
    .bind(&order.customer_name)
    .bind(order.status)
    .bind(order.subtotal_cents)
    .bind(order.discount_cents)
    .bind(order.discount_type)
    .bind(order.tax_cents)
    .bind(order.total_cents)
    .bind(order.is_return)
    .bind(order.created_at)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
        .bind(&order.id)
        .execute(&mut *conn)
        .await?;

    for item in &order.items {
        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, product_id, product_name, sku,
                line_type, quantity, price_cents, cost_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(&item.sku)
        .bind(item.line_type)
        .bind(item.quantity)
        .bind(item.price_cents)
        .bind(item.cost_cents)
        .bind(item.created_at)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Appends a stock log entry. The audit trail is append-only: an id that
/// already exists is left untouched, never updated.
pub(crate) async fn insert_stock_log(
    conn: &mut SqliteConnection,
    entry: &StockLogEntry,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO stock_logs (
            id, tenant_id, product_id, product_name, sku,
            delta, resulting_stock, movement, reason, user_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.tenant_id)
    .bind(&entry.product_id)
    .bind(&entry.product_name)
    .bind(&entry.sku)
    .bind(entry.delta)
    .bind(entry.resulting_stock)
    .bind(entry.movement)
    .bind(&entry.reason)
    .bind(&entry.user_id)
    .bind(entry.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn upsert_category(
    conn: &mut SqliteConnection,
    category: &Category,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO categories (id, tenant_id, name, created_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(id) DO UPDATE SET name = excluded.name
        "#,
    )
    .bind(&category.id)
    .bind(&category.tenant_id)
    .bind(&category.name)
    .bind(category.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn upsert_customer(
    conn: &mut SqliteConnection,
    customer: &Customer,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO customers (id, tenant_id, name, phone, email, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            phone = excluded.phone,
            email = excluded.email
        "#,
    )
    .bind(&customer.id)
    .bind(&customer.tenant_id)
    .bind(&customer.name)
    .bind(&customer.phone)
    .bind(&customer.email)
    .bind(customer.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn upsert_supplier(
    conn: &mut SqliteConnection,
    supplier: &Supplier,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO suppliers (id, tenant_id, name, phone, email, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            phone = excluded.phone,
            email = excluded.email
        "#,
    )
    .bind(&supplier.id)
    .bind(&supplier.tenant_id)
    .bind(&supplier.name)
    .bind(&supplier.phone)
    .bind(&supplier.email)
    .bind(supplier.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn upsert_purchase_order(
    conn: &mut SqliteConnection,
    po: &PurchaseOrder,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO purchase_orders (
            id, tenant_id, supplier_id, supplier_name, status, total_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(id) DO UPDATE SET
            supplier_id = excluded.supplier_id,
            supplier_name = excluded.supplier_name,
            status = excluded.status,
            total_cents = excluded.total_cents
        "#,
    )
    .bind(&po.id)
    .bind(&po.tenant_id)
    .bind(&po.supplier_id)
    .bind(&po.supplier_name)
    .bind(&po.status)
    .bind(po.total_cents)
    .bind(po.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn upsert_expense(
    conn: &mut SqliteConnection,
    expense: &Expense,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO expenses (
            id, tenant_id, description, category, amount_cents, date, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(id) DO UPDATE SET
            description = excluded.description,
            category = excluded.category,
            amount_cents = excluded.amount_cents,
            date = excluded.date
        "#,
    )
    .bind(&expense.id)
    .bind(&expense.tenant_id)
    .bind(&expense.description)
    .bind(&expense.category)
    .bind(expense.amount_cents)
    .bind(expense.date)
    .bind(expense.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn upsert_notification(
    conn: &mut SqliteConnection,
    notification: &Notification,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO notifications (id, tenant_id, message, is_read, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(id) DO UPDATE SET
            message = excluded.message,
            is_read = excluded.is_read
        "#,
    )
    .bind(&notification.id)
    .bind(&notification.tenant_id)
    .bind(&notification.message)
    .bind(notification.is_read)
    .bind(notification.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn upsert_settings(
    conn: &mut SqliteConnection,
    settings: &TenantSettings,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (
            tenant_id, store_name, currency, tax_rate_bps, receipt_footer, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(tenant_id) DO UPDATE SET
            store_name = excluded.store_name,
            currency = excluded.currency,
            tax_rate_bps = excluded.tax_rate_bps,
            receipt_footer = excluded.receipt_footer,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&settings.tenant_id)
    .bind(&settings.store_name)
    .bind(&settings.currency)
    .bind(settings.tax_rate_bps)
    .bind(&settings.receipt_footer)
    .bind(settings.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn upsert_user(conn: &mut SqliteConnection, user: &User) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, tenant_id, name, email, role, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            email = excluded.email,
            role = excluded.role
        "#,
    )
    .bind(&user.id)
    .bind(&user.tenant_id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.role)
    .bind(user.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn upsert_tenant(
    conn: &mut SqliteConnection,
    tenant: &Tenant,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO tenants (id, name, plan, is_active, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            plan = excluded.plan,
            is_active = excluded.is_active
        "#,
    )
    .bind(&tenant.id)
    .bind(&tenant.name)
    .bind(&tenant.plan)
    .bind(tenant.is_active)
    .bind(tenant.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};
    use chrono::{Duration, Utc};

    fn product(id: &str, name: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            tenant_id: "tenant-1".to_string(),
            sku: format!("SKU-{}", id),
            barcode: None,
            name: name.to_string(),
            category_id: None,
            price_cents: 1_000,
            cost_cents: None,
            stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn expense(id: &str, days_ago: i64) -> Expense {
        Expense {
            id: id.to_string(),
            tenant_id: "tenant-1".to_string(),
            description: format!("Expense {}", id),
            category: None,
            amount_cents: 500,
            date: Utc::now() - Duration::days(days_ago),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_cache_all_upsert_overwrites_local_state() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();

        store
            .cache_all(&StateSnapshot {
                products: Some(vec![product("p1", "Widget", 10)]),
                ..Default::default()
            })
            .await
            .unwrap();

        // Server refresh for the same id: the fetched row wins wholesale.
        store
            .cache_all(&StateSnapshot {
                products: Some(vec![product("p1", "Widget (renamed)", 4)]),
                ..Default::default()
            })
            .await
            .unwrap();

        let state = store.load_local_state("tenant-1").await.unwrap();
        assert_eq!(state.products.len(), 1);
        assert_eq!(state.products[0].name, "Widget (renamed)");
        assert_eq!(state.products[0].stock, 4);
    }

    #[tokio::test]
    async fn test_cache_all_spans_multiple_tables() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();

        let snapshot = StateSnapshot {
            products: Some(vec![product("p1", "Widget", 10)]),
            categories: Some(vec![Category {
                id: "c1".to_string(),
                tenant_id: "tenant-1".to_string(),
                name: "Drinks".to_string(),
                created_at: Utc::now(),
            }]),
            customers: Some(vec![Customer {
                id: "cu1".to_string(),
                tenant_id: "tenant-1".to_string(),
                name: "Ada".to_string(),
                phone: None,
                email: None,
                created_at: Utc::now(),
            }]),
            settings: Some(vec![TenantSettings {
                tenant_id: "tenant-1".to_string(),
                store_name: "Main Street".to_string(),
                currency: "USD".to_string(),
                tax_rate_bps: 800,
                receipt_footer: None,
                updated_at: Utc::now(),
            }]),
            ..Default::default()
        };

        store.cache_all(&snapshot).await.unwrap();

        let state = store.load_local_state("tenant-1").await.unwrap();
        assert_eq!(state.products.len(), 1);
        assert_eq!(state.categories.len(), 1);
        assert_eq!(state.customers.len(), 1);
        assert_eq!(state.settings.len(), 1);
        assert_eq!(state.settings[0].tax_rate_bps, 800);
    }

    #[tokio::test]
    async fn test_load_local_state_is_tenant_scoped() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();

        let mut other = product("p2", "Gadget", 3);
        other.tenant_id = "tenant-2".to_string();
        other.sku = "SKU-OTHER".to_string();

        store
            .cache_all(&StateSnapshot {
                products: Some(vec![product("p1", "Widget", 10), other]),
                ..Default::default()
            })
            .await
            .unwrap();

        let state = store.load_local_state("tenant-1").await.unwrap();
        assert_eq!(state.products.len(), 1);
        assert_eq!(state.products[0].id, "p1");
    }

    #[tokio::test]
    async fn test_expenses_sorted_by_date_descending() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();

        store
            .cache_all(&StateSnapshot {
                expenses: Some(vec![expense("e1", 10), expense("e2", 1), expense("e3", 5)]),
                ..Default::default()
            })
            .await
            .unwrap();

        let state = store.load_local_state("tenant-1").await.unwrap();
        let ids: Vec<&str> = state.expenses.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e2", "e3", "e1"]);
    }

    #[tokio::test]
    async fn test_stock_log_is_append_only() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();

        let entry = StockLogEntry {
            id: "log-1".to_string(),
            tenant_id: "tenant-1".to_string(),
            product_id: "p1".to_string(),
            product_name: "Widget".to_string(),
            sku: "SKU-p1".to_string(),
            delta: -2,
            resulting_stock: 8,
            movement: vela_core::MovementType::Sale,
            reason: "Order #abc123".to_string(),
            user_id: "user-1".to_string(),
            created_at: Utc::now(),
        };

        store.stock_logs().append(&entry).await.unwrap();

        // A second write with the same id is ignored, not applied.
        let mut mutated = entry.clone();
        mutated.delta = 999;
        store.stock_logs().append(&mutated).await.unwrap();

        let logs = store.stock_logs().list_for_tenant("tenant-1").await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].delta, -2);
    }
}
