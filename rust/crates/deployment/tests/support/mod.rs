//! Test doubles shared by the deployment integration tests.

use async_trait::async_trait;
use schemaflow_deployment::{
    ClientSqlMutaction, MigrationEngine, MigrationStepMapper, PostgresStepMapper, StepApplier,
};
use schemaflow_error_handling::{PersistenceError, PersistenceResult};
use schemaflow_persistence::{
    ClientDatabase, Migration, MigrationPersistence, MigrationStatus, MigrationStep, Schema,
    SqlStatements,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Migration store over a mutex-guarded map, linearizable per project like
/// the real one.
#[derive(Default)]
pub struct InMemoryMigrationPersistence {
    migrations: Mutex<HashMap<String, Vec<Migration>>>,
    fail_creates: AtomicBool,
}

impl InMemoryMigrationPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with the zeroth migration an external provisioner
    /// would have created.
    pub fn bootstrapped(project_id: &str, schema: Schema) -> Self {
        let store = Self::default();
        store.push(Migration {
            project_id: project_id.to_string(),
            schema,
            steps: vec![],
            revision: 1,
            status: MigrationStatus::Success,
        });
        store
    }

    /// Insert a record directly, bypassing admission. For seeding restart
    /// scenarios.
    pub fn push(&self, migration: Migration) {
        self.migrations
            .lock()
            .unwrap()
            .entry(migration.project_id.clone())
            .or_default()
            .push(migration);
    }

    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn migrations_for(&self, project_id: &str) -> Vec<Migration> {
        self.migrations.lock().unwrap().get(project_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl MigrationPersistence for InMemoryMigrationPersistence {
    async fn get_last_migration(&self, project_id: &str) -> PersistenceResult<Option<Migration>> {
        Ok(self
            .migrations
            .lock()
            .unwrap()
            .get(project_id)
            .and_then(|entries| entries.last().cloned()))
    }

    async fn get_next_migration(&self, project_id: &str) -> PersistenceResult<Option<Migration>> {
        Ok(self.migrations.lock().unwrap().get(project_id).and_then(|entries| {
            entries.iter().find(|m| m.status == MigrationStatus::Pending).cloned()
        }))
    }

    async fn create(&self, migration: Migration) -> PersistenceResult<Migration> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(PersistenceError::query("injected create failure"));
        }

        let mut guard = self.migrations.lock().unwrap();
        let entries = guard.entry(migration.project_id.clone()).or_default();

        if entries.iter().any(|m| m.status == MigrationStatus::Pending) {
            return Err(PersistenceError::pending_migration_exists(&migration.project_id));
        }

        let revision = entries.iter().map(|m| m.revision).max().unwrap_or(0) + 1;
        let stored = Migration { revision, status: MigrationStatus::Pending, ..migration };
        entries.push(stored.clone());
        Ok(stored)
    }

    async fn update_migration_status(
        &self,
        migration: &Migration,
        status: MigrationStatus,
    ) -> PersistenceResult<()> {
        let mut guard = self.migrations.lock().unwrap();
        let entry = guard
            .get_mut(&migration.project_id)
            .and_then(|entries| entries.iter_mut().find(|m| m.revision == migration.revision))
            .ok_or_else(|| {
                PersistenceError::not_found(format!(
                    "migration {}/{}",
                    migration.project_id, migration.revision
                ))
            })?;

        entry.status = status;
        Ok(())
    }
}

/// Client database that records every payload and fails when a statement
/// contains a poisoned marker.
#[derive(Default)]
pub struct RecordingClientDatabase {
    executed: Mutex<Vec<String>>,
    failing_markers: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
}

impl RecordingClientDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, marker: &str) {
        self.failing_markers.lock().unwrap().push(marker.to_string());
    }

    pub fn delay_each_payload(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClientDatabase for RecordingClientDatabase {
    async fn run(&self, statements: &SqlStatements) -> PersistenceResult<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let rendered = statements.to_string();
        let markers = self.failing_markers.lock().unwrap().clone();
        for marker in &markers {
            if rendered.contains(marker.as_str()) {
                return Err(PersistenceError::query(format!("injected failure on '{marker}'")));
            }
        }

        self.executed.lock().unwrap().push(rendered);
        Ok(())
    }
}

/// Mapper whose mutations carry no reverse counterpart.
pub struct IrreversibleStepMapper;

impl MigrationStepMapper for IrreversibleStepMapper {
    fn mutaction_for(
        &self,
        _previous: &Schema,
        _next: &Schema,
        step: &MigrationStep,
    ) -> Option<ClientSqlMutaction> {
        Some(ClientSqlMutaction::new(
            SqlStatements::single(format!("INSERT INTO audit_log VALUES ('{step}')")),
            None,
        ))
    }
}

/// Engine wired to the real Postgres mapper over a recording database.
pub fn engine_over(database: Arc<RecordingClientDatabase>) -> Arc<MigrationEngine> {
    let applier = StepApplier::new(Arc::new(PostgresStepMapper::new()), database);
    Arc::new(MigrationEngine::new(applier))
}

/// Poll the store until the migration reaches a terminal status.
pub async fn wait_for_terminal(
    store: &InMemoryMigrationPersistence,
    project_id: &str,
    revision: i32,
) -> MigrationStatus {
    for _ in 0..400 {
        let status = store
            .migrations_for(project_id)
            .into_iter()
            .find(|m| m.revision == revision)
            .map(|m| m.status);
        if let Some(status) = status {
            if status.is_terminal() {
                return status;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("migration {project_id}/{revision} never reached a terminal status");
}
