//! Forward/rollback orchestration over one migration

use crate::applier::StepApplier;
use crate::progress::MigrationProgress;
use schemaflow_error_handling::{DeployError, DeployResult};
use schemaflow_persistence::{Migration, Schema};

/// Outcome of one engine run.
///
/// `succeeded` is false for any rollback run, clean or not; from the
/// engine's perspective a rolled-back migration did not take effect.
/// `clean_rollback` records whether every reverse step executed without
/// error, which decides between the two rollback terminal statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationApplierResult {
    pub succeeded: bool,
    pub clean_rollback: bool,
}

impl MigrationApplierResult {
    pub fn success() -> Self {
        Self { succeeded: true, clean_rollback: true }
    }

    pub fn rolled_back(clean: bool) -> Self {
        Self { succeeded: false, clean_rollback: clean }
    }
}

/// Applies one migration's steps in order, rolling the applied prefix back
/// in reverse order when a step fails.
pub struct MigrationEngine {
    applier: StepApplier,
}

impl MigrationEngine {
    pub fn new(applier: StepApplier) -> Self {
        Self { applier }
    }

    /// Apply `migration` on top of `previous_schema`.
    ///
    /// Forward steps run in the given order; the first failure flips the run
    /// into rollback mode, which reverses the applied steps latest-first.
    /// Runtime reverse errors are logged and swallowed so rollback always
    /// reaches the bottom of the applied stack; a missing reverse mutation
    /// aborts the run instead. Each loop turn strictly shrinks one side of
    /// the progress, so a run issues at most `2 * steps` step operations.
    pub async fn apply(
        &self,
        previous_schema: &Schema,
        migration: &Migration,
    ) -> DeployResult<MigrationApplierResult> {
        let next_schema = &migration.schema;
        let mut progress = MigrationProgress::new(migration.steps.clone());
        let mut reverse_errors = 0usize;

        loop {
            if progress.is_rolling_back() {
                let Some((step, remaining)) = progress.pop_applied() else {
                    return Ok(MigrationApplierResult::rolled_back(reverse_errors == 0));
                };

                match self.applier.unapply_step(previous_schema, next_schema, &step).await {
                    Ok(()) => {}
                    Err(error @ DeployError::MissingRollbackMutation { .. }) => return Err(error),
                    Err(error) => {
                        reverse_errors += 1;
                        tracing::warn!(
                            step = %step,
                            error = %error,
                            "Reverse step failed; rollback continues"
                        );
                    }
                }
                progress = remaining;
            } else {
                let Some((step, remaining)) = progress.pop_pending() else {
                    return Ok(MigrationApplierResult::success());
                };

                match self.applier.apply_step(previous_schema, next_schema, &step).await {
                    Ok(()) => progress = remaining,
                    Err(error) => {
                        tracing::warn!(
                            step = %step,
                            error = %error,
                            "Step failed; rolling back applied steps"
                        );
                        // The failing step counts as applied so its partial
                        // effects are reversed too.
                        progress = remaining.mark_for_rollback();
                    }
                }
            }
        }
    }
}
