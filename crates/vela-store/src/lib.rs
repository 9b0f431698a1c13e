//! # vela-store: Local Durable Store for Vela POS
//!
//! Tenant-partitioned SQLite storage that survives page reloads and
//! offline periods. This crate is both the offline cache for the admin
//! console AND the write-ahead log for the offline order pipeline.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vela POS Data Flow                               │
//! │                                                                         │
//! │  CartSession::build_order (vela-core)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vela-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌───────────────┐   ┌──────────────────┐  │   │
//! │  │   │    Store     │   │ Repositories  │   │  OrderPipeline   │  │   │
//! │  │   │  (pool.rs)   │   │ product/order │   │  one transaction │  │   │
//! │  │   │              │◄──│ stock_log     │◄──│  order + queue + │  │   │
//! │  │   │ cache_all    │   │ pending       │   │  stock + log     │  │   │
//! │  │   │ load_state   │   └───────────────┘   └──────────────────┘  │   │
//! │  │   └──────────────┘                                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL) - one table per entity kind, tenant-indexed               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and the [`Store`] handle
//! - [`migrations`] - Embedded schema migrations
//! - [`cache`] - Atomic bulk cache writes and tenant state loads
//! - [`pipeline`] - The offline order pipeline (atomic commit)
//! - [`repository`] - Repository implementations (product, order, etc.)
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vela_store::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new("path/to/vela.db")).await?;
//!
//! // Offline checkout: order + queue + stock + audit, atomically
//! store.pipeline().commit_order(&order, true).await?;
//!
//! // Offline search
//! let hits = store.products().search(tenant_id, "coke").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

mod cache;
pub mod error;
pub mod migrations;
pub mod pipeline;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pipeline::OrderPipeline;
pub use pool::{Store, StoreConfig};

// Repository re-exports for convenience
pub use repository::order::OrderRepository;
pub use repository::pending::PendingOrderRepository;
pub use repository::product::ProductRepository;
pub use repository::stock_log::StockLogRepository;
