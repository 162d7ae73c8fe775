//! Validated settings for the deployment service

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Top-level settings tree for a deployment service instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeploymentSettings {
    #[validate(nested)]
    pub database: DatabaseSettings,
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

/// Connection settings for both the migration store and client databases.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseSettings {
    #[validate(url)]
    pub url: String,
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[validate(range(min = 1))]
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_seconds")]
    pub acquire_timeout_seconds: u64,
}

/// Logging settings consumed by the observability crate.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TelemetrySettings {
    #[validate(length(min = 1))]
    pub service_name: String,
    pub level: String,
    pub format: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            service_name: "schemaflow-deploy".to_string(),
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout_seconds() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> DeploymentSettings {
        DeploymentSettings {
            database: DatabaseSettings {
                url: "postgresql://localhost:5432/schemaflow".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
            },
            telemetry: TelemetrySettings::default(),
        }
    }

    #[test]
    fn valid_settings_pass_validation() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn malformed_database_url_fails_validation() {
        let mut settings = valid_settings();
        settings.database.url = "localhost only".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_connections_fail_validation() {
        let mut settings = valid_settings();
        settings.database.max_connections = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn telemetry_defaults_name_the_deploy_service() {
        let telemetry = TelemetrySettings::default();
        assert_eq!(telemetry.service_name, "schemaflow-deploy");
        assert_eq!(telemetry.format, "compact");
    }
}
