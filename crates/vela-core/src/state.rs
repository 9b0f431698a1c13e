//! # Tenant State Collections
//!
//! The collection bundles moved between the Remote Data Gateway and the
//! local durable store.
//!
//! - [`StateSnapshot`] - a PARTIAL bundle: any subset of entity
//!   collections, as returned by the gateway or handed to the bulk cache
//!   writer. Absent collections are left untouched by a cache write.
//! - [`LocalState`] - the COMPLETE local picture for one tenant, as read
//!   back for the SPA. Collections are empty (never missing) on a cold
//!   start.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{
    Category, Customer, Expense, Notification, Order, Product, PurchaseOrder, StockLogEntry,
    Supplier, Tenant, TenantSettings, User,
};

// =============================================================================
// State Snapshot (partial, for cache writes)
// =============================================================================

/// Any subset of tenant entity collections.
///
/// The bulk cache writer upserts every collection that is `Some` inside a
/// single transaction; `None` collections are not touched. The sync
/// reconciler's post-drain refresh passes a full snapshot, which makes the
/// write a "server wins" overwrite of local optimistic state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StateSnapshot {
    pub products: Option<Vec<Product>>,
    pub categories: Option<Vec<Category>>,
    pub orders: Option<Vec<Order>>,
    pub customers: Option<Vec<Customer>>,
    pub suppliers: Option<Vec<Supplier>>,
    pub stock_logs: Option<Vec<StockLogEntry>>,
    pub purchase_orders: Option<Vec<PurchaseOrder>>,
    pub expenses: Option<Vec<Expense>>,
    pub notifications: Option<Vec<Notification>>,
    pub settings: Option<Vec<TenantSettings>>,
    pub users: Option<Vec<User>>,
    pub tenants: Option<Vec<Tenant>>,
}

impl StateSnapshot {
    /// True when no collection is present at all.
    pub fn is_empty(&self) -> bool {
        self.products.is_none()
            && self.categories.is_none()
            && self.orders.is_none()
            && self.customers.is_none()
            && self.suppliers.is_none()
            && self.stock_logs.is_none()
            && self.purchase_orders.is_none()
            && self.expenses.is_none()
            && self.notifications.is_none()
            && self.settings.is_none()
            && self.users.is_none()
            && self.tenants.is_none()
    }
}

// =============================================================================
// Local State (complete, for reads)
// =============================================================================

/// Everything the local store holds for one tenant.
///
/// Collections come back pre-sorted where order matters: orders, stock
/// logs and purchase orders newest-first by creation time, expenses
/// newest-first by expense date. "No local cache yet" is a normal
/// cold-start state and reads as empty collections, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LocalState {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub orders: Vec<Order>,
    pub customers: Vec<Customer>,
    pub suppliers: Vec<Supplier>,
    pub stock_logs: Vec<StockLogEntry>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub expenses: Vec<Expense>,
    pub notifications: Vec<Notification>,
    pub settings: Vec<TenantSettings>,
    pub users: Vec<User>,
    pub tenants: Vec<Tenant>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        assert!(StateSnapshot::default().is_empty());

        let snapshot = StateSnapshot {
            products: Some(Vec::new()),
            ..Default::default()
        };
        // A present-but-empty collection still counts as a write request.
        assert!(!snapshot.is_empty());
    }
}
