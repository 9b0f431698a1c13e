//! # Sync Configuration
//!
//! Connection settings for the Remote Data Gateway. Provided by the
//! embedding shell (Tauri app or web bootstrap) after login; this crate
//! never reads config files itself.

use std::time::Duration;
use url::Url;

use crate::error::{SyncError, SyncResult};

/// Configuration for gateway access and reconciliation.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Gateway base URL, e.g. `https://api.velapos.io/v1/`.
    pub base_url: String,

    /// Bearer token attached to every gateway call.
    pub auth_token: String,

    /// The tenant this terminal is bound to.
    pub tenant_id: String,

    /// Identifier of this terminal, for attribution in logs.
    pub device_id: String,

    /// Per-request timeout for gateway calls.
    pub request_timeout: Duration,
}

impl SyncConfig {
    /// Creates a configuration with default timeouts.
    pub fn new(
        base_url: impl Into<String>,
        auth_token: impl Into<String>,
        tenant_id: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        SyncConfig {
            base_url: base_url.into(),
            auth_token: auth_token.into(),
            tenant_id: tenant_id.into(),
            device_id: device_id.into(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        Url::parse(&self.base_url)?;

        if self.tenant_id.trim().is_empty() {
            return Err(SyncError::InvalidConfig("tenant_id is required".into()));
        }
        if self.auth_token.trim().is_empty() {
            return Err(SyncError::InvalidConfig("auth_token is required".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let config = SyncConfig::new("https://api.example.com/v1/", "token", "tenant-1", "pos-01");
        assert!(config.validate().is_ok());

        let bad_url = SyncConfig::new("not a url", "token", "tenant-1", "pos-01");
        assert!(bad_url.validate().is_err());

        let no_tenant = SyncConfig::new("https://api.example.com/", "token", " ", "pos-01");
        assert!(no_tenant.validate().is_err());
    }
}
