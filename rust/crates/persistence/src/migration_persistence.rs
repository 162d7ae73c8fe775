//! Migration metadata store contract

use crate::types::{Migration, MigrationStatus};
use async_trait::async_trait;
use schemaflow_error_handling::PersistenceResult;

/// Durable, per-project-linearizable store for migration records.
///
/// The deployment worker is the only writer for its project; the store must
/// nevertheless enforce the one-pending-migration invariant itself so that a
/// misbehaving second writer cannot corrupt the sequence.
#[async_trait]
pub trait MigrationPersistence: Send + Sync {
    /// The highest-revision migration for the project, regardless of status.
    async fn get_last_migration(&self, project_id: &str) -> PersistenceResult<Option<Migration>>;

    /// The unique migration with status `Pending`, if any.
    async fn get_next_migration(&self, project_id: &str) -> PersistenceResult<Option<Migration>>;

    /// Persist a new migration with status `Pending` and the next revision,
    /// returning the stored record. Fails with `PendingMigrationExists` when
    /// the project already has a pending migration.
    async fn create(&self, migration: Migration) -> PersistenceResult<Migration>;

    /// Move a migration to a new status. Idempotent for equal transitions.
    async fn update_migration_status(
        &self,
        migration: &Migration,
        status: MigrationStatus,
    ) -> PersistenceResult<()>;
}
