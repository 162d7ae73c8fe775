//! Deployment-worker error handling

use crate::persistence_error::PersistenceError;

/// Errors raised by the deployment worker and the migration engine
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Another migration is already pending for the project.
    #[error("A deployment is already in progress for project {project_id}")]
    DeploymentInProgress { project_id: String },

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// A forward mutation failed at the client database.
    #[error("Step '{step}' failed to apply: {message}")]
    StepApply { step: String, message: String },

    /// The mapper produced a forward mutation without a reverse counterpart.
    /// This is a programming error in the step mapper, not a runtime failure.
    #[error("No rollback mutation exists for step '{step}'")]
    MissingRollbackMutation { step: String },

    /// The project has no migrations at all; an external provisioner must
    /// seed the zeroth migration before a worker is started.
    #[error("Project {project_id} has no migrations; bootstrap it before starting a worker")]
    ProjectNotBootstrapped { project_id: String },

    #[error("The deployment worker for project {project_id} is not running")]
    WorkerStopped { project_id: String },
}

impl DeployError {
    pub fn deployment_in_progress<S: Into<String>>(project_id: S) -> Self {
        Self::DeploymentInProgress { project_id: project_id.into() }
    }

    pub fn step_apply<S: Into<String>, M: Into<String>>(step: S, message: M) -> Self {
        Self::StepApply { step: step.into(), message: message.into() }
    }

    pub fn missing_rollback_mutation<S: Into<String>>(step: S) -> Self {
        Self::MissingRollbackMutation { step: step.into() }
    }

    pub fn project_not_bootstrapped<S: Into<String>>(project_id: S) -> Self {
        Self::ProjectNotBootstrapped { project_id: project_id.into() }
    }

    pub fn worker_stopped<S: Into<String>>(project_id: S) -> Self {
        Self::WorkerStopped { project_id: project_id.into() }
    }

    /// Stable code for log correlation
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DeploymentInProgress { .. } => "DEPLOY_IN_PROGRESS",
            Self::Persistence(_) => "DEPLOY_PERSISTENCE_ERROR",
            Self::StepApply { .. } => "DEPLOY_STEP_APPLY_FAILURE",
            Self::MissingRollbackMutation { .. } => "DEPLOY_MISSING_ROLLBACK",
            Self::ProjectNotBootstrapped { .. } => "DEPLOY_PROJECT_NOT_BOOTSTRAPPED",
            Self::WorkerStopped { .. } => "DEPLOY_WORKER_STOPPED",
        }
    }
}

/// Deployment operation result
pub type DeployResult<T> = Result<T, DeployError>;
