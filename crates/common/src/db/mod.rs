//! Database layer for PayScope
//!
//! Provides:
//! - SeaORM entity models
//! - Store traits consumed by the services
//! - Postgres repository and an in-memory store
//! - Connection pool management

mod memory;
pub mod models;
mod repository;
mod store;

pub use memory::MemoryStore;
pub use repository::Repository;
pub use store::{
    CommentStore, NewComment, SalaryFilter, SalaryStore, Store, VoteStore, MAX_OFFSET,
};

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// Schema applied by [`DbPool::migrate`]
pub const SCHEMA_SQL: &str = include_str!("../../migrations/0001_init.sql");

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    /// Primary connection (for writes)
    pub primary: DatabaseConnection,

    /// Read replica connection (optional)
    pub replica: Option<DatabaseConnection>,
}

async fn connect(url: &str, config: &DatabaseConfig, role: &str) -> Result<DatabaseConnection> {
    info!(role, "Connecting to database");

    let mut opts = ConnectOptions::new(url);
    opts.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .sqlx_logging(config.log_queries);

    Database::connect(opts)
        .await
        .map_err(|e| AppError::DatabaseConnection {
            message: format!("Failed to connect to {}: {}", role, e),
        })
}

async fn ping_one(conn: &DatabaseConnection, role: &str) -> Result<()> {
    conn.execute_unprepared("SELECT 1")
        .await
        .map(|_| ())
        .map_err(|e| AppError::DatabaseConnection {
            message: format!("{} ping failed: {}", role, e),
        })
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let primary = connect(&config.url, config, "primary").await?;
        let replica = match config.read_url {
            Some(ref read_url) => Some(connect(read_url, config, "replica").await?),
            None => None,
        };

        info!(replica = replica.is_some(), "Database connections established");
        Ok(Self { primary, replica })
    }

    /// Get the connection for reads (replica if available, otherwise primary)
    pub fn read(&self) -> &DatabaseConnection {
        self.replica.as_ref().unwrap_or(&self.primary)
    }

    /// Get the connection for writes (always primary)
    pub fn write(&self) -> &DatabaseConnection {
        &self.primary
    }

    /// Apply the idempotent schema on the primary
    pub async fn migrate(&self) -> Result<()> {
        self.primary.execute_unprepared(SCHEMA_SQL).await?;
        info!("Database schema is up to date");
        Ok(())
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        ping_one(&self.primary, "primary").await?;
        if let Some(ref replica) = self.replica {
            ping_one(replica, "replica").await?;
        }
        Ok(())
    }
}
