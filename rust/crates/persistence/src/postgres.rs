//! Postgres implementation of the migration metadata store

use crate::migration_persistence::MigrationPersistence;
use crate::types::{Migration, MigrationStatus};
use async_trait::async_trait;
use chrono::Utc;
use schemaflow_error_handling::{PersistenceError, PersistenceResult};
use sqlx::PgPool;

/// Migration store backed by a `project_migrations` table.
pub struct PostgresMigrationPersistence {
    pool: PgPool,
    table: String,
}

/// Row shape of the migrations table.
#[derive(Debug, sqlx::FromRow)]
struct MigrationRow {
    project_id: String,
    revision: i32,
    schema: serde_json::Value,
    steps: serde_json::Value,
    status: String,
}

impl MigrationRow {
    fn into_migration(self) -> PersistenceResult<Migration> {
        let status = MigrationStatus::parse(&self.status).ok_or_else(|| {
            PersistenceError::serialization(format!("unknown migration status '{}'", self.status))
        })?;

        Ok(Migration {
            project_id: self.project_id,
            schema: serde_json::from_value(self.schema)?,
            steps: serde_json::from_value(self.steps)?,
            revision: self.revision,
            status,
        })
    }
}

impl PostgresMigrationPersistence {
    pub fn new(pool: PgPool) -> Self {
        Self::with_table(pool, "project_migrations")
    }

    pub fn with_table(pool: PgPool, table: impl Into<String>) -> Self {
        Self { pool, table: table.into() }
    }

    /// Create the migrations table and its pending-uniqueness index if absent.
    ///
    /// The partial unique index enforces the one-pending-per-project
    /// invariant even against writers that skip the worker's admission check.
    pub async fn initialize(&self) -> PersistenceResult<()> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                project_id VARCHAR(255) NOT NULL,
                revision INTEGER NOT NULL,
                schema JSONB NOT NULL,
                steps JSONB NOT NULL,
                status VARCHAR(32) NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                PRIMARY KEY (project_id, revision)
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_pending
                ON {table}(project_id) WHERE status = 'PENDING';
            "#,
            table = self.table
        );

        sqlx::raw_sql(&ddl).execute(&self.pool).await?;
        tracing::debug!(table = %self.table, "Migration store initialized");
        Ok(())
    }
}

#[async_trait]
impl MigrationPersistence for PostgresMigrationPersistence {
    async fn get_last_migration(&self, project_id: &str) -> PersistenceResult<Option<Migration>> {
        let query = format!(
            "SELECT project_id, revision, schema, steps, status FROM {} \
             WHERE project_id = $1 ORDER BY revision DESC LIMIT 1",
            self.table
        );

        let row = sqlx::query_as::<_, MigrationRow>(&query)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(MigrationRow::into_migration).transpose()
    }

    async fn get_next_migration(&self, project_id: &str) -> PersistenceResult<Option<Migration>> {
        let query = format!(
            "SELECT project_id, revision, schema, steps, status FROM {} \
             WHERE project_id = $1 AND status = 'PENDING' ORDER BY revision ASC LIMIT 1",
            self.table
        );

        let row = sqlx::query_as::<_, MigrationRow>(&query)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(MigrationRow::into_migration).transpose()
    }

    async fn create(&self, migration: Migration) -> PersistenceResult<Migration> {
        let mut tx = self.pool.begin().await?;

        let next_revision: i32 = sqlx::query_scalar(&format!(
            "SELECT COALESCE(MAX(revision), 0) + 1 FROM {} WHERE project_id = $1",
            self.table
        ))
        .bind(&migration.project_id)
        .fetch_one(&mut *tx)
        .await?;

        let insert = format!(
            "INSERT INTO {} (project_id, revision, schema, steps, status) \
             VALUES ($1, $2, $3, $4, $5)",
            self.table
        );

        let result = sqlx::query(&insert)
            .bind(&migration.project_id)
            .bind(next_revision)
            .bind(serde_json::to_value(&migration.schema)?)
            .bind(serde_json::to_value(&migration.steps)?)
            .bind(MigrationStatus::Pending.as_str())
            .execute(&mut *tx)
            .await;

        if let Err(error) = result {
            if matches!(&error, sqlx::Error::Database(db) if db.is_unique_violation()) {
                return Err(PersistenceError::pending_migration_exists(&migration.project_id));
            }
            return Err(error.into());
        }

        tx.commit().await?;

        tracing::info!(
            project_id = %migration.project_id,
            revision = next_revision,
            "Migration persisted as pending"
        );

        Ok(Migration {
            revision: next_revision,
            status: MigrationStatus::Pending,
            ..migration
        })
    }

    async fn update_migration_status(
        &self,
        migration: &Migration,
        status: MigrationStatus,
    ) -> PersistenceResult<()> {
        let update = format!(
            "UPDATE {} SET status = $1, updated_at = $2 WHERE project_id = $3 AND revision = $4",
            self.table
        );

        let result = sqlx::query(&update)
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(&migration.project_id)
            .bind(migration.revision)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found(format!(
                "migration {}/{}",
                migration.project_id, migration.revision
            )));
        }

        tracing::info!(
            project_id = %migration.project_id,
            revision = migration.revision,
            status = %status,
            "Migration status updated"
        );
        Ok(())
    }
}
