//! Mailbox protocol for the deployment worker

use schemaflow_error_handling::{DeployError, DeployResult};
use schemaflow_persistence::{Migration, MigrationStep, Schema};
use tokio::sync::{mpsc, oneshot};

/// Messages flowing through a worker's mailbox.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Request to admit and persist a new migration. The reply carries the
    /// stored record, or the admission/persistence error.
    Schedule {
        next_schema: Schema,
        steps: Vec<MigrationStep>,
        reply: oneshot::Sender<DeployResult<Migration>>,
    },
    /// Kick the worker to apply the pending migration, if any.
    Deploy,
    /// Posted by a finished continuation; returns the worker to ready.
    /// Carries the new active schema when a migration just succeeded.
    ResumeMessageProcessing { active_schema: Option<Schema> },
}

/// Cloneable handle to a spawned deployment worker.
///
/// Dropping every handle closes the mailbox and lets the worker task exit
/// once the queue drains.
#[derive(Debug, Clone)]
pub struct DeploymentWorkerHandle {
    project_id: String,
    tx: mpsc::UnboundedSender<WorkerMessage>,
}

impl DeploymentWorkerHandle {
    pub(crate) fn new(project_id: String, tx: mpsc::UnboundedSender<WorkerMessage>) -> Self {
        Self { project_id, tx }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Submit a migration for the project.
    ///
    /// Replies with the persisted record, with `DeploymentInProgress` when
    /// another migration is already pending, or with `WorkerStopped` when
    /// the worker has shut down. A successful reply only means the migration
    /// was admitted; callers observe the outcome through its persisted
    /// status.
    pub async fn schedule(
        &self,
        next_schema: Schema,
        steps: Vec<MigrationStep>,
    ) -> DeployResult<Migration> {
        let (reply, response) = oneshot::channel();

        self.tx
            .send(WorkerMessage::Schedule { next_schema, steps, reply })
            .map_err(|_| DeployError::worker_stopped(&self.project_id))?;

        response
            .await
            .map_err(|_| DeployError::worker_stopped(&self.project_id))?
    }

    /// Fire-and-forget deploy kick. Idempotent: a worker with nothing
    /// pending logs a warning and carries on.
    pub fn kick_deploy(&self) {
        let _ = self.tx.send(WorkerMessage::Deploy);
    }
}
