//! # Schemaflow Configuration Management
//!
//! Centralized configuration loading and validation for Schemaflow services.
//!
//! ## Features
//!
//! - Environment-based configuration with optional `.env` support
//! - File-based configuration with per-environment overlays
//! - Validation with detailed error messages
//! - Type-safe settings for the deployment worker and its database
//!
//! ## Example
//!
//! ```rust,no_run
//! use schemaflow_config::{ConfigLoader, DeploymentSettings};
//!
//! # fn example() -> Result<(), config::ConfigError> {
//! let settings: DeploymentSettings = ConfigLoader::new("schemaflow-deploy")
//!     .with_env_prefix("SCHEMAFLOW")
//!     .load()?;
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod settings;

// Re-export main types
pub use loader::{ConfigLoader, RuntimeEnvironment};
pub use settings::{DatabaseSettings, DeploymentSettings, TelemetrySettings};
