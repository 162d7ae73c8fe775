//! Single-step execution against the client database

use crate::mutation::MigrationStepMapper;
use schemaflow_error_handling::{DeployError, DeployResult};
use schemaflow_persistence::{ClientDatabase, MigrationStep, Schema};
use std::sync::Arc;

/// Runs the mapped mutation for one step, forward or reverse.
pub struct StepApplier {
    mapper: Arc<dyn MigrationStepMapper>,
    database: Arc<dyn ClientDatabase>,
}

impl StepApplier {
    pub fn new(mapper: Arc<dyn MigrationStepMapper>, database: Arc<dyn ClientDatabase>) -> Self {
        Self { mapper, database }
    }

    /// Apply one step. A step the mapper maps to nothing is a no-op.
    pub async fn apply_step(
        &self,
        previous: &Schema,
        next: &Schema,
        step: &MigrationStep,
    ) -> DeployResult<()> {
        let Some(mutaction) = self.mapper.mutaction_for(previous, next, step) else {
            tracing::debug!(step = %step, "Step has no database effect");
            return Ok(());
        };

        self.database
            .run(mutaction.execute())
            .await
            .map_err(|e| DeployError::step_apply(step.describe(), e.to_string()))
    }

    /// Reverse one step. A forward mutation without a rollback counterpart
    /// is a programming error in the mapper, surfaced as
    /// `MissingRollbackMutation`; runtime failures are the caller's to
    /// swallow or propagate.
    pub async fn unapply_step(
        &self,
        previous: &Schema,
        next: &Schema,
        step: &MigrationStep,
    ) -> DeployResult<()> {
        let Some(mutaction) = self.mapper.mutaction_for(previous, next, step) else {
            tracing::debug!(step = %step, "Step has no database effect to reverse");
            return Ok(());
        };

        let statements = mutaction
            .rollback()
            .ok_or_else(|| DeployError::missing_rollback_mutation(step.describe()))?;

        self.database
            .run(statements)
            .await
            .map_err(|e| DeployError::step_apply(step.describe(), e.to_string()))
    }
}
