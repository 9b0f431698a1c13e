//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    All prices, discounts, taxes and totals are i64 cents. Division      │
//! │    never happens implicitly; rounding is explicit and symmetric.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are SIGNED throughout: a return-dominant cart legitimately has a
//! negative subtotal, negative tax, and a negative total (money back to the
//! customer). Every rounding helper here rounds half away from zero so that
//! a refunded amount mirrors the charged amount exactly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: refunds and return carts are negative amounts
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

/// Scales `cents` by `bps` basis points (1/10000), rounding half away
/// from zero.
///
/// Symmetry matters: tax on a -$100.00 return at 5% must be exactly
/// -$5.00, the mirror image of the sale. Truncating division would skew
/// negative amounts by a cent.
fn scale_bps(cents: i64, bps: u32) -> i64 {
    let numerator = cents as i128 * bps as i128;
    let rounded = if numerator >= 0 {
        (numerator + 5_000) / 10_000
    } else {
        (numerator - 5_000) / 10_000
    };
    rounded as i64
}

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }

    /// Calculates tax on this amount.
    ///
    /// Tax applies to the NET taxable amount, after discount. A negative
    /// base (return-dominant cart) yields a negative ("refunded") tax.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    /// use vela_core::types::TaxRate;
    ///
    /// let base = Money::from_cents(20000);       // $200.00
    /// let tax = base.calculate_tax(TaxRate::from_bps(800)); // 8%
    /// assert_eq!(tax.cents(), 1600);             // $16.00
    ///
    /// let refund = Money::from_cents(-10000);    // -$100.00
    /// let tax = refund.calculate_tax(TaxRate::from_bps(500)); // 5%
    /// assert_eq!(tax.cents(), -500);             // -$5.00
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money::from_cents(scale_bps(self.0, rate.bps()))
    }

    /// Returns the given percentage of this amount, in basis points
    /// (1000 bps = 10%).
    ///
    /// Used for percentage discounts: the discount AMOUNT is
    /// `subtotal.percentage_of(bps)`, which callers then subtract.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(10000);   // $100.00
    /// assert_eq!(subtotal.percentage_of(1000).cents(), 1000); // 10% = $10.00
    /// ```
    pub fn percentage_of(&self, bps: u32) -> Money {
        Money::from_cents(scale_bps(self.0, bps))
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// For debugging and logs. The SPA formats for display (localization).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_tax_calculation_basic() {
        // $10.00 at 10% = $1.00
        let amount = Money::from_cents(1000);
        let tax = amount.calculate_tax(TaxRate::from_bps(1000));
        assert_eq!(tax.cents(), 100);
    }

    #[test]
    fn test_tax_calculation_with_rounding() {
        // $10.00 at 8.25% = $0.825 → $0.83 (half away from zero)
        let amount = Money::from_cents(1000);
        let tax = amount.calculate_tax(TaxRate::from_bps(825));
        assert_eq!(tax.cents(), 83);
    }

    #[test]
    fn test_tax_rounding_is_symmetric() {
        // A refund's tax must mirror the sale's tax exactly.
        let sale = Money::from_cents(1000);
        let refund = Money::from_cents(-1000);
        let rate = TaxRate::from_bps(825);

        assert_eq!(sale.calculate_tax(rate).cents(), 83);
        assert_eq!(refund.calculate_tax(rate).cents(), -83);
    }

    #[test]
    fn test_negative_tax_for_returns() {
        // -$100.00 at 5% = -$5.00
        let refund = Money::from_cents(-10000);
        let tax = refund.calculate_tax(TaxRate::from_bps(500));
        assert_eq!(tax.cents(), -500);
    }

    #[test]
    fn test_percentage_of() {
        let subtotal = Money::from_cents(10000);
        assert_eq!(subtotal.percentage_of(1000).cents(), 1000); // 10%
        assert_eq!(subtotal.percentage_of(50).cents(), 50); // 0.5%
    }

    #[test]
    fn test_min() {
        let a = Money::from_cents(2000);
        let b = Money::from_cents(1500);
        assert_eq!(a.min(b).cents(), 1500);
        assert_eq!(b.min(a).cents(), 1500);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.cents(), 897);
    }
}
