//! # Schemaflow Observability
//!
//! Structured logging for Schemaflow services.
//!
//! ## Features
//!
//! - Structured logging with configurable levels and formats
//! - `RUST_LOG` environment override via `EnvFilter`
//!
//! ## Example
//!
//! ```rust,no_run
//! use schemaflow_observability::init_tracing;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! init_tracing("schemaflow-deploy", tracing::Level::INFO)?;
//! # Ok(())
//! # }
//! ```

pub mod logging;

// Re-export main functions and types
pub use logging::{init_tracing, init_tracing_with_config, LogFormat, TracingConfig};
