//! Step-to-SQL mapping

use schemaflow_persistence::{FieldType, MigrationStep, Schema, SqlStatements};

/// A concrete database mutation produced by mapping a step against its
/// schemas. Carries the forward payload and, when the step is reversible,
/// its rollback counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSqlMutaction {
    statements: SqlStatements,
    rollback_statements: Option<SqlStatements>,
}

impl ClientSqlMutaction {
    pub fn new(statements: SqlStatements, rollback_statements: Option<SqlStatements>) -> Self {
        Self { statements, rollback_statements }
    }

    /// Forward payload.
    pub fn execute(&self) -> &SqlStatements {
        &self.statements
    }

    /// Reverse payload, when the step is reversible.
    pub fn rollback(&self) -> Option<&SqlStatements> {
        self.rollback_statements.as_ref()
    }
}

/// Translates one logical step plus the before/after schemas into at most
/// one database mutation. Pure; no I/O.
pub trait MigrationStepMapper: Send + Sync {
    fn mutaction_for(
        &self,
        previous: &Schema,
        next: &Schema,
        step: &MigrationStep,
    ) -> Option<ClientSqlMutaction>;
}

/// Default mapper rendering Postgres DDL.
///
/// Metadata-only steps map to no mutation; the applier treats them as
/// no-ops in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresStepMapper;

impl PostgresStepMapper {
    pub fn new() -> Self {
        Self
    }

    fn create_table(name: &str) -> String {
        format!("CREATE TABLE \"{name}\" (id VARCHAR(25) PRIMARY KEY)")
    }

    fn drop_table(name: &str) -> String {
        format!("DROP TABLE \"{name}\"")
    }

    fn add_column(model: &str, field: &str, column_type: FieldType) -> String {
        format!(
            "ALTER TABLE \"{model}\" ADD COLUMN \"{field}\" {}",
            column_type.as_sql()
        )
    }

    fn drop_column(model: &str, field: &str) -> String {
        format!("ALTER TABLE \"{model}\" DROP COLUMN \"{field}\"")
    }

    /// Recreate a dropped table with the columns the previous schema records
    /// for it.
    fn recreate_table(previous: &Schema, name: &str) -> SqlStatements {
        let mut statements = vec![Self::create_table(name)];
        if let Some(model) = previous.model(name) {
            for field in &model.fields {
                statements.push(Self::add_column(name, &field.name, field.column_type));
            }
        }
        SqlStatements::new(statements)
    }
}

impl MigrationStepMapper for PostgresStepMapper {
    fn mutaction_for(
        &self,
        previous: &Schema,
        _next: &Schema,
        step: &MigrationStep,
    ) -> Option<ClientSqlMutaction> {
        match step {
            MigrationStep::CreateModel { name } => Some(ClientSqlMutaction::new(
                SqlStatements::single(Self::create_table(name)),
                Some(SqlStatements::single(Self::drop_table(name))),
            )),
            MigrationStep::DeleteModel { name } => Some(ClientSqlMutaction::new(
                SqlStatements::single(Self::drop_table(name)),
                Some(Self::recreate_table(previous, name)),
            )),
            MigrationStep::CreateField { model, field, column_type } => {
                Some(ClientSqlMutaction::new(
                    SqlStatements::single(Self::add_column(model, field, *column_type)),
                    Some(SqlStatements::single(Self::drop_column(model, field))),
                ))
            }
            MigrationStep::DeleteField { model, field } => {
                // The reverse ADD COLUMN takes its type from the schema the
                // project is migrating away from; unknown fields fall back
                // to TEXT.
                let column_type = previous
                    .model(model)
                    .and_then(|m| m.field(field))
                    .map(|f| f.column_type)
                    .unwrap_or(FieldType::Text);

                Some(ClientSqlMutaction::new(
                    SqlStatements::single(Self::drop_column(model, field)),
                    Some(SqlStatements::single(Self::add_column(model, field, column_type))),
                ))
            }
            MigrationStep::UpdateModelDescription { .. } => None,
        }
    }
}
