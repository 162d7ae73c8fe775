//! # Schemaflow Persistence
//!
//! Durable coordination for per-project migration workers: the migration
//! metadata store, the client-database adapter, and connection management.
//!
//! ## Features
//!
//! - The migration data model (`Schema`, `MigrationStep`, `Migration`)
//! - The `MigrationPersistence` trait and its Postgres implementation
//! - The `ClientDatabase` trait executing mutation payloads transactionally
//! - Connection pooling and health checks
//!
//! ## Example
//!
//! ```rust,no_run
//! use schemaflow_persistence::{
//!     DatabaseConnection, MigrationPersistence, PostgresMigrationPersistence,
//! };
//!
//! # async fn example() -> schemaflow_error_handling::PersistenceResult<()> {
//! let db = DatabaseConnection::new("postgresql://localhost/schemaflow").await?;
//! let store = PostgresMigrationPersistence::new(db.pool().clone());
//! store.initialize().await?;
//!
//! let last = store.get_last_migration("blog-prod").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connection;
pub mod migration_persistence;
pub mod postgres;
pub mod types;

// Re-export main types
pub use client::{ClientDatabase, PostgresClientDatabase, SqlStatements};
pub use connection::{DatabaseConfig, DatabaseConnection};
pub use migration_persistence::MigrationPersistence;
pub use postgres::PostgresMigrationPersistence;
pub use types::*;
