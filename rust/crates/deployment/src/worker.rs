//! Per-project deployment worker state machine

use crate::engine::MigrationEngine;
use crate::protocol::{DeploymentWorkerHandle, WorkerMessage};
use schemaflow_error_handling::{DeployError, DeployResult, PersistenceError};
use schemaflow_persistence::{
    Migration, MigrationPersistence, MigrationStatus, MigrationStep, Schema,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerState {
    Initializing,
    Ready,
    Busy,
}

/// State machine serializing migrations for one project.
///
/// The worker is the single writer for its project's migration sequence. It
/// processes one mailbox message at a time; admission and engine work run in
/// spawned continuations that post `Deploy` and `ResumeMessageProcessing`
/// back to the mailbox, so new `Schedule` requests interleave correctly with
/// engine completion. While busy, `Schedule` is rejected immediately and
/// everything else is stashed for redelivery in arrival order.
pub struct DeploymentWorker {
    project_id: String,
    persistence: Arc<dyn MigrationPersistence>,
    engine: Arc<MigrationEngine>,
    active_schema: Schema,
    state: WorkerState,
    stash: VecDeque<WorkerMessage>,
    rx: mpsc::UnboundedReceiver<WorkerMessage>,
    self_tx: mpsc::WeakUnboundedSender<WorkerMessage>,
}

impl DeploymentWorker {
    /// Spawn the worker task for a project and return its handle.
    ///
    /// The task exits when initialization fails, or once every handle is
    /// dropped and the mailbox has drained. In-flight continuations run to
    /// completion either way; a resume posted after shutdown is discarded.
    pub fn spawn(
        project_id: impl Into<String>,
        persistence: Arc<dyn MigrationPersistence>,
        engine: Arc<MigrationEngine>,
    ) -> DeploymentWorkerHandle {
        let project_id = project_id.into();
        let (tx, rx) = mpsc::unbounded_channel();

        let worker = Self {
            project_id: project_id.clone(),
            persistence,
            engine,
            active_schema: Schema::empty(),
            state: WorkerState::Initializing,
            stash: VecDeque::new(),
            rx,
            self_tx: tx.downgrade(),
        };
        tokio::spawn(worker.run());

        DeploymentWorkerHandle::new(project_id, tx)
    }

    async fn run(mut self) {
        if let Err(error) = self.initialize().await {
            tracing::error!(
                project_id = %self.project_id,
                error = %error,
                "Worker initialization failed; shutting down"
            );
            return;
        }

        while let Some(message) = self.next_message().await {
            self.handle(message);
        }

        tracing::info!(project_id = %self.project_id, "Worker mailbox closed; shutting down");
    }

    /// Load the project's migration state; a pending migration left over
    /// from a previous run is picked up before anything queued externally.
    async fn initialize(&mut self) -> DeployResult<()> {
        let last = self
            .persistence
            .get_last_migration(&self.project_id)
            .await?
            .ok_or_else(|| DeployError::project_not_bootstrapped(&self.project_id))?;

        let revision = last.revision;
        self.active_schema = last.schema;

        if self.persistence.get_next_migration(&self.project_id).await?.is_some() {
            self.stash.push_back(WorkerMessage::Deploy);
        }

        self.state = WorkerState::Ready;
        tracing::info!(project_id = %self.project_id, revision, "Worker initialized");
        Ok(())
    }

    /// Stashed messages are redelivered ahead of the mailbox once ready.
    async fn next_message(&mut self) -> Option<WorkerMessage> {
        if self.state == WorkerState::Ready {
            if let Some(message) = self.stash.pop_front() {
                return Some(message);
            }
        }
        self.rx.recv().await
    }

    fn handle(&mut self, message: WorkerMessage) {
        match (self.state, message) {
            (WorkerState::Busy, WorkerMessage::Schedule { reply, .. }) => {
                let _ = reply.send(Err(DeployError::deployment_in_progress(&self.project_id)));
            }
            (WorkerState::Busy, WorkerMessage::ResumeMessageProcessing { active_schema }) => {
                self.resume(active_schema);
            }
            (WorkerState::Busy, message) => self.stash.push_back(message),
            (_, WorkerMessage::Schedule { next_schema, steps, reply }) => {
                self.start_schedule(next_schema, steps, reply);
            }
            (_, WorkerMessage::Deploy) => self.start_deploy(),
            (_, WorkerMessage::ResumeMessageProcessing { .. }) => {
                tracing::debug!(project_id = %self.project_id, "Stray resume while ready; ignoring");
            }
        }
    }

    fn resume(&mut self, active_schema: Option<Schema>) {
        if let Some(schema) = active_schema {
            self.active_schema = schema;
        }
        self.state = WorkerState::Ready;
    }

    /// Admission and persistence run in a continuation; the worker stays
    /// busy (rejecting further schedules) until the resume arrives.
    fn start_schedule(
        &mut self,
        next_schema: Schema,
        steps: Vec<MigrationStep>,
        reply: oneshot::Sender<DeployResult<Migration>>,
    ) {
        self.state = WorkerState::Busy;

        let persistence = Arc::clone(&self.persistence);
        let project_id = self.project_id.clone();
        let self_tx = self.self_tx.clone();

        tokio::spawn(async move {
            let result = admit_and_create(persistence, project_id, next_schema, steps).await;
            let admitted = result.is_ok();
            let _ = reply.send(result);

            if let Some(tx) = self_tx.upgrade() {
                if admitted {
                    let _ = tx.send(WorkerMessage::Deploy);
                }
                let _ = tx.send(WorkerMessage::ResumeMessageProcessing { active_schema: None });
            }
        });
    }

    fn start_deploy(&mut self) {
        self.state = WorkerState::Busy;

        let persistence = Arc::clone(&self.persistence);
        let engine = Arc::clone(&self.engine);
        let project_id = self.project_id.clone();
        let active_schema = self.active_schema.clone();
        let self_tx = self.self_tx.clone();

        tokio::spawn(async move {
            let advanced = deploy_pending(persistence, engine, &project_id, &active_schema).await;

            if let Some(tx) = self_tx.upgrade() {
                let _ = tx.send(WorkerMessage::ResumeMessageProcessing { active_schema: advanced });
            }
        });
    }
}

/// Admission check plus creation of the pending record. The caller is the
/// single writer for the project, so no lock spans the two persistence
/// calls; the store's own uniqueness guard covers external writers.
async fn admit_and_create(
    persistence: Arc<dyn MigrationPersistence>,
    project_id: String,
    next_schema: Schema,
    steps: Vec<MigrationStep>,
) -> DeployResult<Migration> {
    if persistence.get_next_migration(&project_id).await?.is_some() {
        return Err(DeployError::DeploymentInProgress { project_id });
    }

    let migration = Migration::pending(project_id, next_schema, steps);
    match persistence.create(migration).await {
        Ok(stored) => {
            tracing::info!(
                project_id = %stored.project_id,
                revision = stored.revision,
                steps = stored.steps.len(),
                "Migration scheduled"
            );
            Ok(stored)
        }
        Err(PersistenceError::PendingMigrationExists { project_id }) => {
            Err(DeployError::DeploymentInProgress { project_id })
        }
        Err(error) => Err(error.into()),
    }
}

/// Run the engine over the pending migration, persist the terminal status,
/// and report the new active schema when the migration succeeded.
async fn deploy_pending(
    persistence: Arc<dyn MigrationPersistence>,
    engine: Arc<MigrationEngine>,
    project_id: &str,
    active_schema: &Schema,
) -> Option<Schema> {
    let migration = match persistence.get_next_migration(project_id).await {
        Ok(Some(migration)) => migration,
        Ok(None) => {
            tracing::warn!(project_id, "Deploy requested but no migration is pending");
            return None;
        }
        Err(error) => {
            tracing::error!(project_id, error = %error, "Could not load the pending migration");
            return None;
        }
    };

    let status = match engine.apply(active_schema, &migration).await {
        Ok(result) if result.succeeded => MigrationStatus::Success,
        Ok(result) if result.clean_rollback => MigrationStatus::RollbackSuccess,
        Ok(_) => MigrationStatus::RollbackFailure,
        Err(error) => {
            tracing::error!(
                project_id,
                revision = migration.revision,
                error = %error,
                "Engine run failed fatally"
            );
            MigrationStatus::RollbackFailure
        }
    };

    if let Err(error) = persistence.update_migration_status(&migration, status).await {
        // Left pending; retrying is supervisor policy.
        tracing::error!(
            project_id,
            revision = migration.revision,
            error = %error,
            "Could not persist the terminal migration status"
        );
        return None;
    }

    tracing::info!(
        project_id,
        revision = migration.revision,
        status = %status,
        "Migration finished"
    );

    (status == MigrationStatus::Success).then(|| migration.schema)
}
