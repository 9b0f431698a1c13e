//! # vela-core: Pure Business Logic for Vela POS
//!
//! This crate is the heart of the Vela POS terminal. It contains the cart
//! engine and all domain types as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vela POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Admin Console / POS Terminal (SPA)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ vela-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│   │   │
//! │  │   │  Product  │  │   Money   │  │CartSession│  │   rules   │   │   │
//! │  │   │   Order   │  │  TaxRate  │  │ CartLine  │  │   checks  │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        vela-store (local cache)   vela-sync (reconciler)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, StockLogEntry, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The cart session: line merging and total composition
//! - [`state`] - Tenant state collections moved between gateway and cache
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every derived total is recomputed from current state
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartLine, CartSession, CartTotals, PartyRef};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use state::{LocalState, StateSnapshot};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Display label for a sale with no selected customer.
///
/// Orders keep the label in `customer_name` so receipts and reports never
/// render an empty party field.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

/// Default cost ratio in basis points: 70% of sale price.
///
/// When a product has no recorded cost, margin tracking falls back to this
/// estimate. It is a heuristic, not a real cost figure - consumers of
/// profit reports must treat lines priced through
/// [`types::Product::cost_or_estimated`] accordingly.
pub const DEFAULT_COST_RATIO_BPS: u32 = 7_000;

/// Maximum quantity of a single line in a cart.
///
/// Guards against fat-finger quantities (typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
