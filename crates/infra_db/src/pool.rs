//! Database connection pool management
//!
//! This module provides connection pool creation for PostgreSQL using SQLx,
//! plus the embedded migration runner.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::DatabaseError;

/// Type alias for the PostgreSQL connection pool
pub type DatabasePool = PgPool;

/// Creates a database connection pool with the given configuration
///
/// This function establishes a connection pool to PostgreSQL with the
/// specified settings. The pool manages connection lifecycle and provides
/// efficient connection reuse.
///
/// # Arguments
///
/// * `config` - Database configuration options
///
/// # Returns
///
/// A `Result` containing the connection pool or a database error
///
/// # Errors
///
/// Returns `DatabaseError::ConnectionFailed` if the pool cannot be created
///
/// # Example
///
/// ```rust,ignore
/// use infra_db::{create_pool, DatabaseConfig};
///
/// let config = DatabaseConfig::new("postgres://localhost/microlend");
/// let pool = create_pool(config).await?;
/// ```
pub async fn create_pool(config: DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!(
        "Creating database pool with max_connections={}, min_connections={}",
        config.max_connections, config.min_connections
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!("Database pool created successfully");
    Ok(pool)
}

/// Creates a connection pool from a URL string with default settings
///
/// This is a convenience function for simple use cases where default
/// pool settings are acceptable.
///
/// # Arguments
///
/// * `url` - PostgreSQL connection string
///
/// # Returns
///
/// A `Result` containing the connection pool or a database error
pub async fn create_pool_from_url(url: &str) -> Result<DatabasePool, DatabaseError> {
    create_pool(DatabaseConfig::new(url)).await
}

/// Runs all pending schema migrations against the pool
///
/// Migrations are embedded at compile time from the workspace `migrations/`
/// directory, so deployed binaries carry their own schema history.
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    info!("Running database migrations");
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations complete");
    Ok(())
}
