//! # Schemaflow Error Handling
//!
//! Common error types used across the Schemaflow migration services.
//!
//! This crate provides standardized error handling patterns to ensure
//! consistency between the persistence layer and the deployment worker, and
//! proper error propagation to `schedule` callers.
//!
//! ## Features
//!
//! - `PersistenceError` for the migration store and the client database
//! - `DeployError` for worker admission and engine failures
//! - Result aliases and stable error codes for log correlation
//! - Conversions from `sqlx` errors behind the `database` feature
//!
//! ## Example
//!
//! ```rust
//! use schemaflow_error_handling::{DeployError, DeployResult};
//!
//! fn admit(project_id: &str, pending: bool) -> DeployResult<()> {
//!     if pending {
//!         return Err(DeployError::deployment_in_progress(project_id));
//!     }
//!     Ok(())
//! }
//! ```

pub mod deploy_error;
pub mod persistence_error;

// Re-export the main types
pub use deploy_error::{DeployError, DeployResult};
pub use persistence_error::{PersistenceError, PersistenceResult};
