//! # Store Pool Management
//!
//! Connection pool creation and configuration for the local SQLite store.
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled: readers don't block
//! writers and a crash mid-transaction recovers cleanly - which is exactly
//! the property the offline order pipeline leans on.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use vela_core::{LocalState, StateSnapshot};

use crate::cache;
use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::pipeline::OrderPipeline;
use crate::repository::order::OrderRepository;
use crate::repository::pending::PendingOrderRepository;
use crate::repository::product::ProductRepository;
use crate::repository::stock_log::StockLogRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Local store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("/path/to/vela.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (sufficient for a local terminal)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    pub min_connections: u32,

    /// Connection timeout duration.
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    pub run_migrations: bool,
}

impl StoreConfig {
    /// Creates a new store configuration with the given path.
    ///
    /// The database file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory store configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let store = Store::new(StoreConfig::in_memory()).await?;
    /// // Isolated database, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        StoreConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Main handle to the local durable store.
///
/// Cloneable (the pool is shared); the checkout pipeline, the repositories
/// and the sync reconciler all operate on the same underlying database.
/// Only the pipeline writes order/stock/log rows; only the reconciler
/// deletes pending-queue rows; both may write product rows, and the
/// reconciler's server-refresh write is the final word.
#[derive(Debug, Clone)]
pub struct Store {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Store {
    /// Opens the local store.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite for terminal workloads:
    ///    - WAL mode for concurrent reads
    ///    - NORMAL synchronous
    ///    - Foreign keys enabled
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: StoreConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening local store"
        );

        // sqlite://path?mode=rwc creates the file if not exists
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Store pool created"
        );

        let store = Store { pool };

        if config.run_migrations {
            store.run_migrations().await?;
        }

        Ok(store)
    }

    /// Runs pending schema migrations. Idempotent.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        info!("Running store migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    ///
    /// For advanced queries not covered by repositories. Prefer repository
    /// methods when available.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the product repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Returns the order repository.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// Returns the stock log repository.
    pub fn stock_logs(&self) -> StockLogRepository {
        StockLogRepository::new(self.pool.clone())
    }

    /// Returns the pending-order queue repository.
    pub fn pending_orders(&self) -> PendingOrderRepository {
        PendingOrderRepository::new(self.pool.clone())
    }

    /// Returns the offline order pipeline.
    pub fn pipeline(&self) -> OrderPipeline {
        OrderPipeline::new(self.pool.clone())
    }

    /// Bulk-upserts any subset of entity collections in ONE transaction.
    ///
    /// All-or-nothing: a failure anywhere rolls back every table, so the
    /// cache can never hold mixed old/new state across entity kinds.
    pub async fn cache_all(&self, snapshot: &StateSnapshot) -> StoreResult<()> {
        cache::cache_all(&self.pool, snapshot).await
    }

    /// Reads every entity collection for one tenant, pre-sorted where
    /// order matters. Cold start reads as empty collections, not an error.
    pub async fn load_local_state(&self, tenant_id: &str) -> StoreResult<LocalState> {
        cache::load_local_state(&self.pool, tenant_id).await
    }

    /// Closes the connection pool. Call on application shutdown.
    pub async fn close(&self) {
        info!("Closing store pool");
        self.pool.close().await;
    }

    /// Checks if the store is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        assert!(store.health_check().await);
    }

    #[tokio::test]
    async fn test_cold_start_reads_empty() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let state = store.load_local_state("tenant-1").await.unwrap();

        assert!(state.products.is_empty());
        assert!(state.orders.is_empty());
        assert!(state.stock_logs.is_empty());
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
    }
}
