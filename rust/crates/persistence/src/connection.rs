//! Database connection management

use schemaflow_error_handling::{PersistenceError, PersistenceResult};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Database connection manager
pub struct DatabaseConnection {
    pool: PgPool,
    config: DatabaseConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost:5432/postgres".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl DatabaseConnection {
    /// Create a new database connection with custom config
    pub async fn with_config(config: DatabaseConfig) -> PersistenceResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect(&config.url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to database: {}", e);
                PersistenceError::connection(e.to_string())
            })?;

        tracing::info!(
            max_connections = config.max_connections,
            "Connected to database"
        );

        Ok(Self { pool, config })
    }

    /// Create a new database connection with default config
    pub async fn new<S: Into<String>>(url: S) -> PersistenceResult<Self> {
        let config = DatabaseConfig { url: url.into(), ..DatabaseConfig::default() };
        Self::with_config(config).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Round-trip a trivial query to confirm the database is reachable
    pub async fn ping(&self) -> PersistenceResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }
}
