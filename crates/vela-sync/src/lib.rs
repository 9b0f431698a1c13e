//! # vela-sync: Sync Reconciler for Vela POS
//!
//! Converges local optimistic state with the Remote Data Gateway's
//! authoritative state whenever connectivity is available.
//!
//! ## The Offline Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CHECKOUT (any connectivity)                                            │
//! │    OrderService::add_order                                              │
//! │      ├── online  → gateway first, local commit without queue entry      │
//! │      └── offline → local commit WITH queue entry                        │
//! │                                                                         │
//! │  RECONNECT (browser online event / startup)                             │
//! │    SyncAgent ──► Reconciler::sync_now                                   │
//! │      1. drain pending queue FIFO (per-item isolation, at-least-once)    │
//! │      2. fetch tenant state from gateway                                 │
//! │      3. cache_all: server wins over local optimistic numbers            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`gateway`] - `RemoteGateway` trait + HTTP/JSON implementation
//! - [`connection`] - online/offline watch channel
//! - [`reconciler`] - the drain/refresh algorithm
//! - [`checkout`] - `add_order` online/offline dispatcher
//! - [`agent`] - startup + reconnect triggers
//! - [`config`] - gateway connection settings
//! - [`error`] - sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vela_sync::{
//!     ConnectionMonitor, ConnectionState, HttpGateway, OrderService, Reconciler, SyncAgent,
//!     SyncConfig,
//! };
//!
//! let config = SyncConfig::new(base_url, token, tenant_id, device_id);
//! let gateway = Arc::new(HttpGateway::new(&config)?);
//! let connection = ConnectionMonitor::new(ConnectionState::Online);
//!
//! // Checkout entry point for the terminal UI
//! let orders = OrderService::new(store.clone(), gateway.clone(), connection.clone());
//!
//! // Background reconciliation
//! let reconciler = Reconciler::new(store, gateway, &config.tenant_id);
//! let (agent, handle) = SyncAgent::new(reconciler, &connection);
//! tokio::spawn(agent.run());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod agent;
pub mod checkout;
pub mod config;
pub mod connection;
pub mod error;
pub mod gateway;
pub mod reconciler;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use agent::{SyncAgent, SyncAgentHandle};
pub use checkout::OrderService;
pub use config::SyncConfig;
pub use connection::{ConnectionMonitor, ConnectionState};
pub use error::{SyncError, SyncResult};
pub use gateway::{HttpGateway, RemoteGateway};
pub use reconciler::{Reconciler, SyncReport};
