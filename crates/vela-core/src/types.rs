//! # Domain Types
//!
//! Core domain types used throughout Vela POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │  StockLogEntry  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  status         │   │  delta (signed) │       │
//! │  │  price_cents    │   │  total_cents    │   │  resulting_stock│       │
//! │  │  stock          │   │  items[]        │   │  movement       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    LineType     │   │   OrderStatus   │   │  PendingOrder   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Sale (+1)      │   │  Pending...     │   │  order_id (PK)  │       │
//! │  │  Return (-1)    │   │  Returned       │   │  payload (JSON) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, minted on the device (offline-safe)
//! - Business ID: (sku, etc.) - human-readable, potentially mutable
//!
//! All entities carry a `tenant_id`; the local cache is tenant-partitioned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::DEFAULT_COST_RATIO_BPS;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000, so 825 bps = 8.25%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (8.25 → 825 bps).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Creates a tax rate from a fraction (0.08 → 800 bps).
    ///
    /// The SPA configures tax as a fraction; everything below the API
    /// boundary works in basis points.
    pub fn from_fraction(fraction: f64) -> Self {
        TaxRate((fraction * 10_000.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Line Type
// =============================================================================

/// Direction of a cart or order line.
///
/// Sale lines decrement inventory and contribute positively to totals;
/// return lines increment inventory and contribute negatively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    Sale,
    Return,
}

impl LineType {
    /// Sign applied to this line's amount in total composition.
    #[inline]
    pub const fn sign(&self) -> i64 {
        match self {
            LineType::Sale => 1,
            LineType::Return => -1,
        }
    }

    /// Signed stock change for committing `quantity` units of this line.
    ///
    /// A sale takes stock out (-qty); a return puts it back (+qty).
    #[inline]
    pub const fn stock_delta(&self, quantity: i64) -> i64 {
        match self {
            LineType::Sale => -quantity,
            LineType::Return => quantity,
        }
    }

    /// The opposite direction.
    #[inline]
    pub const fn toggled(&self) -> LineType {
        match self {
            LineType::Sale => LineType::Return,
            LineType::Return => LineType::Sale,
        }
    }

    /// The stock-movement kind this line produces when committed.
    #[inline]
    pub const fn movement(&self) -> MovementType {
        match self {
            LineType::Sale => MovementType::Sale,
            LineType::Return => MovementType::Return,
        }
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Storage/reporting tag for the discount applied to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// A discount specification on a cart.
///
/// The discount AMOUNT is derived by the cart (see
/// [`crate::cart::CartSession::discount_amount`]): zero on a non-positive
/// subtotal, percentage of the subtotal, or a fixed amount capped at the
/// subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the subtotal, in basis points (1000 = 10%).
    Percentage(u32),
    /// Fixed amount in cents.
    Fixed(i64),
}

impl Discount {
    /// The storage tag for this discount.
    pub const fn kind(&self) -> DiscountType {
        match self {
            Discount::Percentage(_) => DiscountType::Percentage,
            Discount::Fixed(_) => DiscountType::Fixed,
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
    Returned,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Kind of stock mutation recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Committed sale line.
    Sale,
    /// Committed return line.
    Return,
    /// Goods received (purchase-order receipt).
    In,
    /// Goods removed outside a sale.
    Out,
    /// Manual admin correction.
    Adjustment,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the tenant catalog (cached copy of the gateway's truth).
///
/// `stock` is mutated locally only by order commits; manual adjustments and
/// purchase-order receipts happen against the gateway and arrive via
/// refresh. The sale-side quantity cap in the cart uses a stock SNAPSHOT
/// taken at add time, so a long session can oversell a unit another
/// terminal took - an accepted race in a single-writer-per-terminal
/// deployment.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this product belongs to.
    pub tenant_id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Category reference (optional).
    pub category_id: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Cost in cents (for profit margin calculations). Often absent.
    pub cost_cents: Option<i64>,

    /// Current stock level.
    pub stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the recorded unit cost, or the named 70%-of-price estimate.
    ///
    /// Margin reports consuming orders must be aware the cost may be this
    /// heuristic rather than a real figure.
    pub fn cost_or_estimated(&self) -> Money {
        match self.cost_cents {
            Some(cents) => Money::from_cents(cents),
            None => self.price().percentage_of(DEFAULT_COST_RATIO_BPS),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// The durable record produced by checkout.
///
/// `subtotal_cents` / `discount_cents` / `tax_cents` / `total_cents` are
/// the cart's derived figures copied verbatim at checkout. They are never
/// recomputed downstream - receipts and financial reports must agree with
/// what was charged.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub tenant_id: String,

    /// The user operating the terminal.
    pub user_id: String,

    /// Attributed salesperson (may differ from the operating user).
    pub salesperson_id: Option<String>,
    pub salesperson_name: Option<String>,

    /// Selected customer, or the walk-in label when anonymous.
    pub customer_id: Option<String>,
    pub customer_name: String,

    pub status: OrderStatus,

    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub discount_type: Option<DiscountType>,
    pub tax_cents: i64,

    /// Signed grand total, post discount and tax.
    pub total_cents: i64,

    /// True iff every line of the order is a return.
    pub is_return: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Line items. Persisted in their own table; populated on load.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Trailing segment of the order id, used in receipts and stock-log
    /// reasons ("Order #a1b2c3d4e5f6").
    pub fn short_id(&self) -> &str {
        self.id.rsplit('-').next().unwrap_or(&self.id)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub product_name: String,

    /// SKU at time of sale (frozen).
    pub sku: String,

    /// Sale or return direction of this line.
    pub line_type: LineType,

    /// Quantity sold or returned (always positive; direction is the type).
    pub quantity: i64,

    /// Unit price in cents at time of sale (frozen).
    pub price_cents: i64,

    /// Unit cost in cents at time of sale (frozen; may be the estimate).
    pub cost_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Signed contribution of this line to the order subtotal.
    pub fn signed_line_total(&self) -> Money {
        Money::from_cents(self.price_cents * self.quantity * self.line_type.sign())
    }
}

// =============================================================================
// Stock Log
// =============================================================================

/// An immutable, append-only record of one stock mutation.
///
/// Created exactly once per product line per committed order; never
/// mutated or deleted afterwards. This is the audit trail for inventory.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockLogEntry {
    pub id: String,
    pub tenant_id: String,
    pub product_id: String,
    pub product_name: String,
    pub sku: String,

    /// Signed change amount (-3 for a sale of 3, +1 for one return).
    pub delta: i64,

    /// Stock level AFTER applying the change.
    pub resulting_stock: i64,

    pub movement: MovementType,

    /// Free-text reason, e.g. "Order #a1b2c3d4e5f6".
    pub reason: String,

    /// The user whose action caused the mutation.
    pub user_id: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Pending Order (sync queue)
// =============================================================================

/// An order committed locally but not yet acknowledged by the gateway.
///
/// Keyed by order id: re-committing the same order cannot enqueue a
/// duplicate. Entries are deleted only by the sync reconciler, only after
/// the gateway accepts the order (at-least-once delivery; the gateway
/// dedupes by order id).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PendingOrder {
    pub order_id: String,
    pub tenant_id: String,

    /// The full order (with items) as JSON.
    pub payload: String,

    /// Number of failed submission attempts.
    pub attempts: i64,

    /// Last gateway error, if any.
    pub last_error: Option<String>,

    #[ts(as = "String")]
    pub queued_at: DateTime<Utc>,
}

// =============================================================================
// Console Entities (cached for the admin SPA)
// =============================================================================

/// Product category.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// CRM customer record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Purchasing supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A purchase order placed with a supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseOrder {
    pub id: String,
    pub tenant_id: String,
    pub supplier_id: String,
    pub supplier_name: String,
    pub status: String,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// An operating expense.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: String,
    pub tenant_id: String,
    pub description: String,
    pub category: Option<String>,
    pub amount_cents: i64,
    /// When the expense was incurred (reports sort on this, not created_at).
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Console notification.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Notification {
    pub id: String,
    pub tenant_id: String,
    pub message: String,
    pub is_read: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Per-tenant store settings.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TenantSettings {
    pub tenant_id: String,
    pub store_name: String,
    pub currency: String,
    pub tax_rate_bps: u32,
    pub receipt_footer: Option<String>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A staff member of a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A tenant (isolated store instance) as seen by the super-admin console.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub plan: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
