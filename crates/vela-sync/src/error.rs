//! # Sync Error Types
//!
//! Error types for gateway calls and reconciliation.
//!
//! ## Propagation Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Gateway failure during drain → logged, entry retained, NEXT entry      │
//! │  Reconciler failure in agent  → logged, never propagated (background)   │
//! │  Store failure during commit  → propagated to the checkout caller       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering gateway and reconciliation failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Invalid gateway base URL.
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Gateway Errors
    // =========================================================================
    /// The request never completed (connection refused, DNS, timeout).
    #[error("Gateway request failed: {0}")]
    RequestFailed(String),

    /// Bearer token rejected. Token invalidation is handled by the
    /// session layer, outside this crate.
    #[error("Gateway rejected credentials (401)")]
    Unauthorized,

    /// The gateway answered with a non-success status.
    #[error("Gateway returned {status}: {message}")]
    GatewayStatus { status: u16, message: String },

    // =========================================================================
    // Data Errors
    // =========================================================================
    /// Failed to encode or decode a payload.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Local store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] vela_store::StoreError),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// Internal sync error.
    #[error("Internal error: {0}")]
    Internal(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::RequestFailed(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl SyncError {
    /// Returns true if the failed operation can be retried on a later
    /// sync attempt.
    ///
    /// Network failures and server-side errors are retryable; rejected
    /// credentials and malformed payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::RequestFailed(_) => true,
            SyncError::GatewayStatus { status, .. } => *status >= 500,
            SyncError::Store(_) => true,
            _ => false,
        }
    }
}
