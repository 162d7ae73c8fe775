//! Configuration loader with environment and file support

use config::{Config as ConfigBuilder, ConfigError, Environment as EnvSource, File};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use validator::Validate;

/// Configuration loader layering files, environment variables, and
/// programmatic overrides.
pub struct ConfigLoader {
    service_name: String,
    env_prefix: Option<String>,
    config_files: Vec<String>,
    overrides: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a new config loader for a service
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            env_prefix: None,
            config_files: vec!["config/default".to_string()],
            overrides: HashMap::new(),
        }
    }

    /// Set environment variable prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Add a configuration file
    pub fn with_config_file(mut self, file: impl Into<String>) -> Self {
        self.config_files.push(file.into());
        self
    }

    /// Add environment-specific config file
    pub fn with_env_config_file(self, environment: &str) -> Self {
        let file = format!("config/{}", environment);
        self.with_config_file(file)
    }

    /// Override a configuration value
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Load configuration from all sources and validate it
    pub fn load<T: DeserializeOwned + Validate>(&self) -> Result<T, ConfigError> {
        let settings: T = self.load_unvalidated()?;

        settings
            .validate()
            .map_err(|e| ConfigError::Message(format!("Validation error: {}", e)))?;

        tracing::info!("Configuration loaded for service: {}", self.service_name);
        Ok(settings)
    }

    /// Load configuration without validation (for partial configs)
    pub fn load_unvalidated<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        // Make .env values visible to the environment source below.
        dotenvy::dotenv().ok();

        let mut builder = ConfigBuilder::builder();

        for file in &self.config_files {
            builder = builder.add_source(File::with_name(file).required(false));
            tracing::debug!("Added config source: {}", file);
        }

        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(EnvSource::with_prefix(prefix).separator("__"));
        }

        for (key, value) in &self.overrides {
            builder = builder.set_override(key, value.clone())?;
        }

        let config = builder.build()?;
        config
            .try_deserialize()
            .map_err(|e| ConfigError::Message(format!("Deserialization error: {}", e)))
    }
}

/// Runtime environment detection
pub struct RuntimeEnvironment;

impl RuntimeEnvironment {
    /// Get current environment (development, staging, production)
    pub fn current() -> String {
        std::env::var("ENVIRONMENT")
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }

    pub fn is_development() -> bool {
        Self::current() == "development"
    }

    pub fn is_production() -> bool {
        Self::current() == "production"
    }

    pub fn is_staging() -> bool {
        Self::current() == "staging"
    }
}
