//! Client-database access for mutation payloads

use async_trait::async_trait;
use schemaflow_error_handling::PersistenceResult;
use sqlx::PgPool;
use std::fmt;

/// Ordered SQL payload submitted to the client database as one executable
/// unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatements(Vec<String>);

impl SqlStatements {
    pub fn new(statements: Vec<String>) -> Self {
        Self(statements)
    }

    pub fn single(statement: impl Into<String>) -> Self {
        Self(vec![statement.into()])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SqlStatements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("; "))
    }
}

/// Target database holding a project's user-facing data.
///
/// Isolation between projects is the database's responsibility; a worker only
/// ever touches the tables owned by its own project.
#[async_trait]
pub trait ClientDatabase: Send + Sync {
    /// Execute the payload as a single unit. Either every statement takes
    /// effect or none do.
    async fn run(&self, statements: &SqlStatements) -> PersistenceResult<()>;
}

/// Client database backed by a Postgres pool.
pub struct PostgresClientDatabase {
    pool: PgPool,
}

impl PostgresClientDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientDatabase for PostgresClientDatabase {
    async fn run(&self, statements: &SqlStatements) -> PersistenceResult<()> {
        if statements.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for statement in statements.as_slice() {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::debug!(statements = %statements, "Client database payload executed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_render_in_order() {
        let statements = SqlStatements::new(vec![
            "CREATE TABLE \"posts\" (id VARCHAR(25) PRIMARY KEY)".into(),
            "ALTER TABLE \"posts\" ADD COLUMN \"title\" TEXT".into(),
        ]);
        assert_eq!(
            statements.to_string(),
            "CREATE TABLE \"posts\" (id VARCHAR(25) PRIMARY KEY); \
             ALTER TABLE \"posts\" ADD COLUMN \"title\" TEXT"
        );
    }

    #[test]
    fn empty_payload_is_detectable() {
        assert!(SqlStatements::new(vec![]).is_empty());
        assert!(!SqlStatements::single("SELECT 1").is_empty());
    }
}
