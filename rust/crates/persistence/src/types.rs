//! Migration data model shared by the store and the deployment worker.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical database schema snapshot for one project.
///
/// Equality is structural. The deployment core never mutates a schema; it
/// only hands snapshots to the step mapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub models: Vec<Model>,
}

impl Schema {
    /// The schema of a project with no models yet.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_models(models: Vec<Model>) -> Self {
        Self { models }
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }
}

/// One model (table) in a project schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Model {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self { name: name.into(), fields }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One scalar field (column) on a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub column_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, column_type: FieldType) -> Self {
        Self { name: name.into(), column_type }
    }
}

/// Column types the step mapper knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Json,
}

impl FieldType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "BIGINT",
            Self::Float => "DOUBLE PRECISION",
            Self::Boolean => "BOOLEAN",
            Self::Timestamp => "TIMESTAMP WITH TIME ZONE",
            Self::Json => "JSONB",
        }
    }
}

/// One atomic logical change within a migration. Order is significant.
///
/// Not every step has a database effect; metadata-only steps map to no
/// mutation and are applied (and reversed) as no-ops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum MigrationStep {
    CreateModel { name: String },
    DeleteModel { name: String },
    CreateField { model: String, field: String, column_type: FieldType },
    DeleteField { model: String, field: String },
    UpdateModelDescription { model: String, description: String },
}

impl MigrationStep {
    /// Short label used in logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::CreateModel { name } => format!("CreateModel({name})"),
            Self::DeleteModel { name } => format!("DeleteModel({name})"),
            Self::CreateField { model, field, .. } => format!("CreateField({model}.{field})"),
            Self::DeleteField { model, field } => format!("DeleteField({model}.{field})"),
            Self::UpdateModelDescription { model, .. } => {
                format!("UpdateModelDescription({model})")
            }
        }
    }
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Lifecycle status of a migration.
///
/// Only the deployment worker moves a migration out of `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationStatus {
    Pending,
    Success,
    RollbackSuccess,
    RollbackFailure,
}

impl MigrationStatus {
    /// Database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::RollbackSuccess => "ROLLBACK_SUCCESS",
            Self::RollbackFailure => "ROLLBACK_FAILURE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(Self::Pending),
            "SUCCESS" => Some(Self::Success),
            "ROLLBACK_SUCCESS" => Some(Self::RollbackSuccess),
            "ROLLBACK_FAILURE" => Some(Self::RollbackFailure),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered set of schema changes from one schema to the next, persisted
/// as a unit with a status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Migration {
    pub project_id: String,
    /// The schema this migration moves the project to.
    pub schema: Schema,
    pub steps: Vec<MigrationStep>,
    /// Monotonically increasing per project; assigned by the store.
    pub revision: i32,
    pub status: MigrationStatus,
}

impl Migration {
    /// A new, not-yet-persisted migration. The store assigns the revision on
    /// `create`.
    pub fn pending(project_id: impl Into<String>, schema: Schema, steps: Vec<MigrationStep>) -> Self {
        Self {
            project_id: project_id.into(),
            schema,
            steps,
            revision: 0,
            status: MigrationStatus::Pending,
        }
    }
}
