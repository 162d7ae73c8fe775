//! Step progress bookkeeping for one migration run

use schemaflow_persistence::MigrationStep;

/// Immutable snapshot of applied and pending steps within a single run.
///
/// Every mutator returns a new value. `applied_steps` followed by
/// `pending_steps` always equals the original step sequence, and the
/// rollback flag never reverts to false within a run.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationProgress {
    applied_steps: Vec<MigrationStep>,
    pending_steps: Vec<MigrationStep>,
    is_rolling_back: bool,
}

impl MigrationProgress {
    pub fn new(steps: Vec<MigrationStep>) -> Self {
        Self {
            applied_steps: Vec::new(),
            pending_steps: steps,
            is_rolling_back: false,
        }
    }

    pub fn applied_steps(&self) -> &[MigrationStep] {
        &self.applied_steps
    }

    pub fn pending_steps(&self) -> &[MigrationStep] {
        &self.pending_steps
    }

    pub fn is_rolling_back(&self) -> bool {
        self.is_rolling_back
    }

    /// Move the head of the pending steps onto the applied side.
    pub fn pop_pending(&self) -> Option<(MigrationStep, MigrationProgress)> {
        let (head, tail) = self.pending_steps.split_first()?;

        let mut applied_steps = self.applied_steps.clone();
        applied_steps.push(head.clone());

        let next = Self {
            applied_steps,
            pending_steps: tail.to_vec(),
            is_rolling_back: self.is_rolling_back,
        };
        Some((head.clone(), next))
    }

    /// Remove the most recently applied step; it is the next to be reversed.
    pub fn pop_applied(&self) -> Option<(MigrationStep, MigrationProgress)> {
        let (last, init) = self.applied_steps.split_last()?;

        let next = Self {
            applied_steps: init.to_vec(),
            pending_steps: self.pending_steps.clone(),
            is_rolling_back: self.is_rolling_back,
        };
        Some((last.clone(), next))
    }

    pub fn mark_for_rollback(mut self) -> Self {
        self.is_rolling_back = true;
        self
    }
}
