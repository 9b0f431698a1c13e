//! # Remote Data Gateway
//!
//! The network API that is the eventual source of truth for stock levels,
//! order status and tenant data.
//!
//! [`RemoteGateway`] is the seam the reconciler and the checkout
//! dispatcher depend on; [`HttpGateway`] is the production HTTP/JSON
//! implementation. Tests substitute their own implementation.
//!
//! The gateway is expected to be IDEMPOTENT on order id: the pending
//! queue gives at-least-once delivery, so a create already applied may be
//! submitted again after a lost acknowledgement.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use vela_core::{Order, Product, StateSnapshot, StockLogEntry};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};

// =============================================================================
// Gateway Trait
// =============================================================================

/// In-process interface to the remote authority.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Persists an order server-side, applying stock effects
    /// authoritatively. Returns the accepted order.
    async fn create_order(&self, order: &Order) -> SyncResult<Order>;

    /// Fetches a tenant's full product collection.
    async fn products(&self, tenant_id: &str) -> SyncResult<Vec<Product>>;

    /// Fetches a tenant's full order collection.
    async fn orders(&self, tenant_id: &str) -> SyncResult<Vec<Order>>;

    /// Fetches a tenant's full stock-log collection.
    async fn stock_logs(&self, tenant_id: &str) -> SyncResult<Vec<StockLogEntry>>;

    /// Fetches all tenant-scoped collections for a server-wins refresh.
    ///
    /// The default composes the three hot collections; richer gateways
    /// override this to include the rest of the console entities.
    async fn fetch_state(&self, tenant_id: &str) -> SyncResult<StateSnapshot> {
        Ok(StateSnapshot {
            products: Some(self.products(tenant_id).await?),
            orders: Some(self.orders(tenant_id).await?),
            stock_logs: Some(self.stock_logs(tenant_id).await?),
            ..Default::default()
        })
    }
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// HTTP/JSON gateway client with bearer-token authentication.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
    auth_token: String,
}

impl HttpGateway {
    /// Builds a gateway client from the sync configuration.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let base_url = Url::parse(&config.base_url)?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(HttpGateway {
            client,
            base_url,
            auth_token: config.auth_token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> SyncResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn check(response: reqwest::Response) -> SyncResult<reqwest::Response> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(SyncError::Unauthorized),
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(SyncError::GatewayStatus {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> SyncResult<T> {
        debug!(path = %path, "Gateway GET");

        let response = self
            .client
            .get(self.endpoint(path)?)
            .bearer_auth(&self.auth_token)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn create_order(&self, order: &Order) -> SyncResult<Order> {
        debug!(order_id = %order.id, "Gateway POST orders");

        let response = self
            .client
            .post(self.endpoint("orders")?)
            .bearer_auth(&self.auth_token)
            .json(order)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn products(&self, tenant_id: &str) -> SyncResult<Vec<Product>> {
        self.get_json(&format!("tenants/{}/products", tenant_id)).await
    }

    async fn orders(&self, tenant_id: &str) -> SyncResult<Vec<Order>> {
        self.get_json(&format!("tenants/{}/orders", tenant_id)).await
    }

    async fn stock_logs(&self, tenant_id: &str) -> SyncResult<Vec<StockLogEntry>> {
        self.get_json(&format!("tenants/{}/stock-logs", tenant_id))
            .await
    }

    /// The HTTP gateway pulls the full console state, not just the three
    /// hot collections.
    async fn fetch_state(&self, tenant_id: &str) -> SyncResult<StateSnapshot> {
        Ok(StateSnapshot {
            products: Some(self.products(tenant_id).await?),
            orders: Some(self.orders(tenant_id).await?),
            stock_logs: Some(self.stock_logs(tenant_id).await?),
            categories: Some(self.get_json(&format!("tenants/{}/categories", tenant_id)).await?),
            customers: Some(self.get_json(&format!("tenants/{}/customers", tenant_id)).await?),
            suppliers: Some(self.get_json(&format!("tenants/{}/suppliers", tenant_id)).await?),
            purchase_orders: Some(
                self.get_json(&format!("tenants/{}/purchase-orders", tenant_id))
                    .await?,
            ),
            expenses: Some(self.get_json(&format!("tenants/{}/expenses", tenant_id)).await?),
            notifications: Some(
                self.get_json(&format!("tenants/{}/notifications", tenant_id))
                    .await?,
            ),
            settings: Some(self.get_json(&format!("tenants/{}/settings", tenant_id)).await?),
            users: Some(self.get_json(&format!("tenants/{}/users", tenant_id)).await?),
            tenants: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_endpoint_join() {
        let config = SyncConfig::new("https://api.example.com/v1/", "t", "tenant-1", "pos-01")
            .request_timeout(Duration::from_secs(5));
        let gateway = HttpGateway::new(&config).unwrap();

        let url = gateway.endpoint("tenants/tenant-1/products").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/tenants/tenant-1/products"
        );
    }
}
