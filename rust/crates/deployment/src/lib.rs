//! # Schemaflow Deployment
//!
//! The per-project migration worker: serialization, forward application, and
//! reverse-order rollback of schema migrations against a project's client
//! database.
//!
//! ## Features
//!
//! - `DeploymentWorker`: one state-machine task per project guaranteeing at
//!   most one concurrent migration, with FIFO admission over a mailbox
//! - `MigrationEngine`: ordered forward execution that switches to
//!   reverse-order rollback on the first failing step
//! - `StepApplier` + `MigrationStepMapper`: translation of logical steps
//!   into transactional SQL mutations
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use schemaflow_deployment::{
//!     DeploymentWorker, MigrationEngine, PostgresStepMapper, StepApplier,
//! };
//! use schemaflow_persistence::{ClientDatabase, MigrationPersistence, MigrationStep, Schema};
//!
//! # async fn example(
//! #     persistence: Arc<dyn MigrationPersistence>,
//! #     client_database: Arc<dyn ClientDatabase>,
//! # ) -> schemaflow_error_handling::DeployResult<()> {
//! let applier = StepApplier::new(Arc::new(PostgresStepMapper::new()), client_database);
//! let worker = DeploymentWorker::spawn(
//!     "blog-prod",
//!     persistence,
//!     Arc::new(MigrationEngine::new(applier)),
//! );
//!
//! let steps = vec![MigrationStep::CreateModel { name: "posts".into() }];
//! let migration = worker.schedule(Schema::empty(), steps).await?;
//! # Ok(())
//! # }
//! ```

pub mod applier;
pub mod engine;
pub mod mutation;
pub mod progress;
pub mod protocol;
pub mod worker;

// Re-export main types
pub use applier::StepApplier;
pub use engine::{MigrationApplierResult, MigrationEngine};
pub use mutation::{ClientSqlMutaction, MigrationStepMapper, PostgresStepMapper};
pub use progress::MigrationProgress;
pub use protocol::{DeploymentWorkerHandle, WorkerMessage};
pub use worker::DeploymentWorker;
