//! # Cart Session
//!
//! The in-progress transaction at a POS terminal.
//!
//! ## Session Object, Not A Singleton
//! A `CartSession` is an explicit value owned by the terminal view and
//! passed by reference to whoever needs it (checkout handler, totals
//! panel). There is no ambient global cart: multiple terminal sessions can
//! coexist and unit tests never reset shared state.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Session Operations                              │
//! │                                                                         │
//! │  Scan Product ───────────► add_product() ───────► merge or append line  │
//! │  Change Quantity ────────► update_quantity() ───► qty += delta (capped) │
//! │  Flip Sale/Return ───────► toggle_line_type() ──► line flipped in place │
//! │  Click Remove ───────────► remove_line() ───────► line removed          │
//! │  Checkout ───────────────► build_order() ───────► Order (totals frozen) │
//! │                                                                         │
//! │  Validation rejections (qty to zero, sale past stock snapshot) are      │
//! │  SILENT no-ops: scanning must never interrupt the cashier.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Total Composition Order
//! Totals are derived fresh on every call, never cached, in fixed order:
//!
//! 1. `subtotal` - signed sum of lines (returns negative)
//! 2. `discount_amount` - zero when subtotal <= 0; percentage of subtotal,
//!    or fixed amount capped at the subtotal
//! 3. `tax` - on the POST-discount amount
//! 4. `total = subtotal - discount_amount + tax`
//!
//! Discount before tax, tax on the net taxable amount. The receipt renderer
//! and the financial reports both assume exactly this composition.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Discount, LineType, Order, OrderItem, OrderStatus, Product, TaxRate};
use crate::WALK_IN_CUSTOMER;

// =============================================================================
// Cart Line
// =============================================================================

/// One row of the in-progress transaction.
///
/// Price, cost and stock are SNAPSHOTS taken when the line was created;
/// later catalog edits do not reprice a cart mid-transaction.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub product_name: String,
    pub sku: String,

    /// Sale or return direction of this line.
    pub line_type: LineType,

    /// Quantity, always >= 1.
    pub quantity: i64,

    /// Unit price in cents at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Unit cost in cents at time of adding (frozen; may be the 70%
    /// estimate when the product has no recorded cost).
    pub unit_cost_cents: i64,

    /// Stock level observed when the line was created. Sale quantity is
    /// capped here; the cap can go stale during a long session.
    pub stock_at_add: i64,
}

impl CartLine {
    fn from_product(product: &Product, line_type: LineType) -> Self {
        CartLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            sku: product.sku.clone(),
            line_type,
            quantity: 1,
            unit_price_cents: product.price_cents,
            unit_cost_cents: product.cost_or_estimated().cents(),
            stock_at_add: product.stock,
        }
    }

    /// Signed contribution of this line to the subtotal.
    fn signed_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity * self.line_type.sign()
    }
}

// =============================================================================
// Party Reference
// =============================================================================

/// Lightweight reference to a selected customer or salesperson.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PartyRef {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Cart Session
// =============================================================================

/// The active cart at one terminal.
///
/// ## Invariants
/// - At most one line per (product_id, line_type) pair - adds merge
/// - Quantity is always >= 1; a change that would reach 0 is rejected
/// - Sale quantity never exceeds the line's stock snapshot
///
/// ## Lifecycle
/// Created empty on terminal load, mutated through the operations below,
/// cleared on successful checkout or explicit reset. Deliberately NOT
/// persisted: a page reload drops the working cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSession {
    /// Lines in scan order.
    pub lines: Vec<CartLine>,

    /// Selected customer; `None` means an anonymous walk-in.
    pub customer: Option<PartyRef>,

    /// Attributed salesperson.
    pub salesperson: Option<PartyRef>,

    /// Discount specification, if any.
    pub discount: Option<Discount>,

    /// Tax rate applied to the post-discount amount.
    pub tax_rate: TaxRate,

    /// When set, newly added lines default to `Return`.
    pub return_mode: bool,
}

impl CartSession {
    /// Creates a new empty cart session.
    pub fn new() -> Self {
        CartSession::default()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of `product` to the cart.
    ///
    /// The line type comes from the session's return mode. If a line with
    /// the same (product, type) exists its quantity is incremented;
    /// otherwise a new line snapshots the product's price, cost and stock.
    ///
    /// Sale lines silently refuse to grow past the stock snapshot -
    /// including a first add when the product is out of stock. No error:
    /// the scan-and-add flow must not be interrupted.
    pub fn add_product(&mut self, product: &Product) {
        let line_type = if self.return_mode {
            LineType::Return
        } else {
            LineType::Sale
        };

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product.id && l.line_type == line_type)
        {
            if line_type == LineType::Sale && line.quantity + 1 > line.stock_at_add {
                return;
            }
            line.quantity += 1;
            return;
        }

        if line_type == LineType::Sale && product.stock < 1 {
            return;
        }

        self.lines.push(CartLine::from_product(product, line_type));
    }

    /// Removes the matching line entirely (not a decrement).
    pub fn remove_line(&mut self, product_id: &str, line_type: LineType) {
        self.lines
            .retain(|l| !(l.product_id == product_id && l.line_type == line_type));
    }

    /// Adjusts a line's quantity by `delta`.
    ///
    /// Rejected (line unchanged) when the result would be <= 0, or when a
    /// sale line would exceed its stock snapshot.
    pub fn update_quantity(&mut self, product_id: &str, line_type: LineType, delta: i64) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id && l.line_type == line_type)
        {
            let new_quantity = line.quantity + delta;
            if new_quantity <= 0 {
                return;
            }
            if line_type == LineType::Sale && new_quantity > line.stock_at_add {
                return;
            }
            line.quantity = new_quantity;
        }
    }

    /// Flips a line between sale and return in place (quantity unchanged).
    ///
    /// Does NOT merge with an existing line of the target type, unlike
    /// `add_product` which does merge. A toggle can therefore produce two
    /// lines with the same (product, type) pair; totals remain correct
    /// since they sum over lines.
    pub fn toggle_line_type(&mut self, product_id: &str, current: LineType) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id && l.line_type == current)
        {
            line.line_type = current.toggled();
        }
    }

    /// Selects the customer for this transaction.
    pub fn set_customer(&mut self, customer: Option<PartyRef>) {
        self.customer = customer;
    }

    /// Attributes the transaction to a salesperson.
    pub fn set_salesperson(&mut self, salesperson: Option<PartyRef>) {
        self.salesperson = salesperson;
    }

    /// Sets or clears the discount specification.
    pub fn set_discount(&mut self, discount: Option<Discount>) {
        self.discount = discount;
    }

    /// Sets the tax rate.
    pub fn set_tax_rate(&mut self, tax_rate: TaxRate) {
        self.tax_rate = tax_rate;
    }

    /// Switches the default line type for newly added products.
    pub fn set_return_mode(&mut self, return_mode: bool) {
        self.return_mode = return_mode;
    }

    /// Flips the global return mode (the terminal's RETURN key).
    pub fn toggle_return_mode(&mut self) {
        self.return_mode = !self.return_mode;
    }

    /// Resets to the empty/default state (no customer, no discount,
    /// return mode off).
    pub fn clear(&mut self) {
        *self = CartSession::default();
    }

    // =========================================================================
    // Derived State
    // =========================================================================

    /// Signed sum of all lines. More returns than sales yields a negative
    /// subtotal.
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.lines.iter().map(CartLine::signed_total_cents).sum())
    }

    /// The discount amount actually applied.
    ///
    /// Zero when the subtotal is non-positive (no discount on
    /// return-dominant carts). A fixed discount can never exceed the
    /// subtotal.
    pub fn discount_amount(&self) -> Money {
        let subtotal = self.subtotal();
        if subtotal.cents() <= 0 {
            return Money::zero();
        }

        match self.discount {
            None => Money::zero(),
            Some(Discount::Percentage(bps)) => subtotal.percentage_of(bps),
            Some(Discount::Fixed(cents)) => Money::from_cents(cents.max(0)).min(subtotal),
        }
    }

    /// Tax on the post-discount amount. Negative for net-negative carts.
    pub fn tax(&self) -> Money {
        (self.subtotal() - self.discount_amount()).calculate_tax(self.tax_rate)
    }

    /// Grand total: `subtotal - discount + tax`.
    pub fn total(&self) -> Money {
        let subtotal = self.subtotal();
        let discount = self.discount_amount();
        subtotal - discount + (subtotal - discount).calculate_tax(self.tax_rate)
    }

    /// Quantity currently in the cart for a (product, type) pair.
    pub fn quantity_of(&self, product_id: &str, line_type: LineType) -> i64 {
        self.lines
            .iter()
            .filter(|l| l.product_id == product_id && l.line_type == line_type)
            .map(|l| l.quantity)
            .sum()
    }

    /// Number of lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True when every line is a return.
    pub fn is_return_cart(&self) -> bool {
        !self.lines.is_empty() && self.lines.iter().all(|l| l.line_type == LineType::Return)
    }

    /// Display name for the selected customer (walk-in label when none).
    pub fn customer_display_name(&self) -> &str {
        self.customer
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(WALK_IN_CUSTOMER)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Freezes this cart into an [`Order`] ready for the commit pipeline.
    ///
    /// The order's stored subtotal/discount/tax/total are this cart's
    /// derived figures - downstream code must never recompute them with
    /// different logic. The cart itself is left untouched; the checkout
    /// caller clears it after a successful commit so a failed commit can
    /// be retried.
    pub fn build_order(&self, tenant_id: &str, user_id: &str) -> CoreResult<Order> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let order_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let items = self
            .lines
            .iter()
            .map(|line| OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                sku: line.sku.clone(),
                line_type: line.line_type,
                quantity: line.quantity,
                price_cents: line.unit_price_cents,
                cost_cents: line.unit_cost_cents,
                created_at: now,
            })
            .collect();

        Ok(Order {
            id: order_id,
            tenant_id: tenant_id.to_string(),
            user_id: user_id.to_string(),
            salesperson_id: self.salesperson.as_ref().map(|s| s.id.clone()),
            salesperson_name: self.salesperson.as_ref().map(|s| s.name.clone()),
            customer_id: self.customer.as_ref().map(|c| c.id.clone()),
            customer_name: self.customer_display_name().to_string(),
            status: OrderStatus::Completed,
            subtotal_cents: self.subtotal().cents(),
            discount_cents: self.discount_amount().cents(),
            discount_type: self.discount.map(|d| d.kind()),
            tax_cents: self.tax().cents(),
            total_cents: self.total().cents(),
            is_return: self.is_return_cart(),
            created_at: now,
            items,
        })
    }
}

// =============================================================================
// Cart Totals DTO
// =============================================================================

/// Cart totals summary for the SPA totals panel.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl From<&CartSession> for CartTotals {
    fn from(cart: &CartSession) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            subtotal_cents: cart.subtotal().cents(),
            discount_cents: cart.discount_amount().cents(),
            tax_cents: cart.tax().cents(),
            total_cents: cart.total().cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            tenant_id: "tenant-1".to_string(),
            sku: format!("SKU-{}", id),
            barcode: None,
            name: format!("Product {}", id),
            category_id: None,
            price_cents,
            cost_cents: None,
            stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_merges_same_product_and_type() {
        let mut cart = CartSession::new();
        let p = product("1", 999, 10);

        cart.add_product(&p);
        cart.add_product(&p);

        // One line with quantity 2, not two lines.
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity_of("1", LineType::Sale), 2);
    }

    #[test]
    fn test_sale_quantity_capped_at_stock_snapshot() {
        let mut cart = CartSession::new();
        let p = product("1", 500, 2);

        cart.add_product(&p);
        cart.add_product(&p);
        cart.add_product(&p); // past stock: silent no-op

        assert_eq!(cart.quantity_of("1", LineType::Sale), 2);

        // update_quantity is bounded by the same snapshot.
        cart.update_quantity("1", LineType::Sale, 5);
        assert_eq!(cart.quantity_of("1", LineType::Sale), 2);
    }

    #[test]
    fn test_out_of_stock_product_never_enters_cart() {
        let mut cart = CartSession::new();
        let p = product("1", 500, 0);

        cart.add_product(&p);
        assert!(cart.is_empty());

        // But it can be RETURNED regardless of stock.
        cart.set_return_mode(true);
        cart.add_product(&p);
        assert_eq!(cart.quantity_of("1", LineType::Return), 1);
    }

    #[test]
    fn test_return_mode_controls_default_line_type() {
        let mut cart = CartSession::new();
        let p = product("1", 500, 10);

        cart.add_product(&p);
        cart.set_return_mode(true);
        cart.add_product(&p);

        // Separate lines per (product, type).
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.quantity_of("1", LineType::Sale), 1);
        assert_eq!(cart.quantity_of("1", LineType::Return), 1);
    }

    #[test]
    fn test_quantity_never_drops_to_zero() {
        let mut cart = CartSession::new();
        let p = product("1", 500, 10);
        cart.add_product(&p);

        cart.update_quantity("1", LineType::Sale, -1); // would reach 0
        assert_eq!(cart.quantity_of("1", LineType::Sale), 1);

        cart.update_quantity("1", LineType::Sale, -5); // far below
        assert_eq!(cart.quantity_of("1", LineType::Sale), 1);
    }

    #[test]
    fn test_remove_line_deletes_whole_line() {
        let mut cart = CartSession::new();
        let p = product("1", 500, 10);
        cart.add_product(&p);
        cart.add_product(&p);

        cart.remove_line("1", LineType::Sale);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_toggle_flips_in_place_without_merging() {
        // Pins the documented asymmetry: add_product merges, toggle does not.
        let mut cart = CartSession::new();
        let p = product("1", 500, 10);

        cart.add_product(&p); // sale line, qty 1
        cart.set_return_mode(true);
        cart.add_product(&p); // return line, qty 1
        cart.set_return_mode(false);

        cart.toggle_line_type("1", LineType::Sale);

        // Two return lines now coexist; they are NOT merged.
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.quantity_of("1", LineType::Return), 2);
        assert_eq!(cart.quantity_of("1", LineType::Sale), 0);

        // Totals still sum correctly across the duplicate lines.
        assert_eq!(cart.subtotal().cents(), -1000);
    }

    #[test]
    fn test_scenario_sale_only() {
        // One SALE line (price $100.00, qty 2), no discount, 8% tax:
        // subtotal 200.00, discount 0, tax 16.00, total 216.00
        let mut cart = CartSession::new();
        let p = product("1", 10_000, 10);
        cart.add_product(&p);
        cart.update_quantity("1", LineType::Sale, 1);
        cart.set_tax_rate(TaxRate::from_fraction(0.08));

        assert_eq!(cart.subtotal().cents(), 20_000);
        assert_eq!(cart.discount_amount().cents(), 0);
        assert_eq!(cart.tax().cents(), 1_600);
        assert_eq!(cart.total().cents(), 21_600);
    }

    #[test]
    fn test_scenario_mixed_sale_and_return() {
        // SALE $100.00 x2 plus RETURN $50.00 x1, 10% tax:
        // subtotal 150.00, tax 15.00, total 165.00
        let mut cart = CartSession::new();
        let sale = product("1", 10_000, 10);
        let ret = product("2", 5_000, 10);

        cart.add_product(&sale);
        cart.update_quantity("1", LineType::Sale, 1);
        cart.set_return_mode(true);
        cart.add_product(&ret);
        cart.set_tax_rate(TaxRate::from_fraction(0.10));

        assert_eq!(cart.subtotal().cents(), 15_000);
        assert_eq!(cart.discount_amount().cents(), 0);
        assert_eq!(cart.tax().cents(), 1_500);
        assert_eq!(cart.total().cents(), 16_500);
    }

    #[test]
    fn test_scenario_pure_return_suppresses_discount() {
        // Single RETURN $100.00, FIXED discount $20.00, 5% tax:
        // subtotal -100.00 → discount 0 → tax -5.00 → total -105.00
        let mut cart = CartSession::new();
        let p = product("1", 10_000, 10);

        cart.set_return_mode(true);
        cart.add_product(&p);
        cart.set_discount(Some(Discount::Fixed(2_000)));
        cart.set_tax_rate(TaxRate::from_fraction(0.05));

        assert_eq!(cart.subtotal().cents(), -10_000);
        assert_eq!(cart.discount_amount().cents(), 0);
        assert_eq!(cart.tax().cents(), -500);
        assert_eq!(cart.total().cents(), -10_500);
        assert!(cart.is_return_cart());
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let mut cart = CartSession::new();
        let p = product("1", 1_000, 10); // $10.00
        cart.add_product(&p);

        cart.set_discount(Some(Discount::Fixed(5_000))); // $50.00 > subtotal
        assert_eq!(cart.discount_amount().cents(), 1_000);
        assert_eq!(cart.total().cents(), 0);
    }

    #[test]
    fn test_percentage_discount_applied_before_tax() {
        let mut cart = CartSession::new();
        let p = product("1", 10_000, 10); // $100.00
        cart.add_product(&p);
        cart.set_discount(Some(Discount::Percentage(1_000))); // 10%
        cart.set_tax_rate(TaxRate::from_fraction(0.10));

        // discount 10.00, taxable 90.00, tax 9.00, total 99.00
        assert_eq!(cart.discount_amount().cents(), 1_000);
        assert_eq!(cart.tax().cents(), 900);
        assert_eq!(cart.total().cents(), 9_900);
    }

    #[test]
    fn test_total_composition_law() {
        // total == subtotal - discount + tax(subtotal - discount), across
        // discount kinds, values and tax rates.
        let discounts = [
            None,
            Some(Discount::Percentage(0)),
            Some(Discount::Percentage(750)),
            Some(Discount::Percentage(10_000)),
            Some(Discount::Fixed(0)),
            Some(Discount::Fixed(1_234)),
            Some(Discount::Fixed(1_000_000)),
        ];
        let tax_rates = [0u32, 500, 825, 1_000, 2_500];

        for discount in discounts {
            for bps in tax_rates {
                let mut cart = CartSession::new();
                let a = product("1", 3_333, 50);
                let b = product("2", 799, 50);
                cart.add_product(&a);
                cart.update_quantity("1", LineType::Sale, 2);
                cart.set_return_mode(true);
                cart.add_product(&b);
                cart.set_return_mode(false);
                cart.set_discount(discount);
                cart.set_tax_rate(TaxRate::from_bps(bps));

                let subtotal = cart.subtotal();
                let d = cart.discount_amount();
                let tax = (subtotal - d).calculate_tax(TaxRate::from_bps(bps));
                assert_eq!(cart.tax(), tax);
                assert_eq!(cart.total(), subtotal - d + tax);
            }
        }
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut cart = CartSession::new();
        let p = product("1", 500, 10);
        cart.add_product(&p);
        cart.set_discount(Some(Discount::Percentage(500)));
        cart.set_return_mode(true);
        cart.set_customer(Some(PartyRef {
            id: "c1".into(),
            name: "Ada".into(),
        }));

        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.discount.is_none());
        assert!(cart.customer.is_none());
        assert!(!cart.return_mode);
    }

    #[test]
    fn test_build_order_freezes_cart_totals() {
        let mut cart = CartSession::new();
        let p = product("1", 10_000, 10);
        cart.add_product(&p);
        cart.update_quantity("1", LineType::Sale, 1);
        cart.set_discount(Some(Discount::Fixed(2_000)));
        cart.set_tax_rate(TaxRate::from_fraction(0.08));

        let order = cart.build_order("tenant-1", "user-1").unwrap();

        assert_eq!(order.subtotal_cents, cart.subtotal().cents());
        assert_eq!(order.discount_cents, cart.discount_amount().cents());
        assert_eq!(order.tax_cents, cart.tax().cents());
        assert_eq!(order.total_cents, cart.total().cents());
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.customer_name, WALK_IN_CUSTOMER);
        assert!(!order.is_return);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].order_id, order.id);
    }

    #[test]
    fn test_build_order_flags_pure_return() {
        let mut cart = CartSession::new();
        let p = product("1", 1_000, 10);
        cart.set_return_mode(true);
        cart.add_product(&p);

        let order = cart.build_order("tenant-1", "user-1").unwrap();
        assert!(order.is_return);
        assert!(order.total_cents < 0);
    }

    #[test]
    fn test_build_order_rejects_empty_cart() {
        let cart = CartSession::new();
        assert!(matches!(
            cart.build_order("tenant-1", "user-1"),
            Err(CoreError::EmptyCart)
        ));
    }
}
