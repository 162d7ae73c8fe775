//! Migration-store and client-database error handling

/// Errors raised by the migration persistence and the client database
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Query error: {message}")]
    Query { message: String },

    #[error("Transaction error: {message}")]
    Transaction { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("A pending migration already exists for project {project_id}")]
    PendingMigrationExists { project_id: String },
}

impl PersistenceError {
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection { message: message.into() }
    }

    pub fn query<S: Into<String>>(message: S) -> Self {
        Self::Query { message: message.into() }
    }

    pub fn transaction<S: Into<String>>(message: S) -> Self {
        Self::Transaction { message: message.into() }
    }

    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization { message: message.into() }
    }

    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    pub fn pending_migration_exists<S: Into<String>>(project_id: S) -> Self {
        Self::PendingMigrationExists { project_id: project_id.into() }
    }

    /// Stable code for log correlation
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "PERSISTENCE_CONNECTION_ERROR",
            Self::Query { .. } => "PERSISTENCE_QUERY_ERROR",
            Self::Transaction { .. } => "PERSISTENCE_TRANSACTION_ERROR",
            Self::Serialization { .. } => "PERSISTENCE_SERIALIZATION_ERROR",
            Self::NotFound { .. } => "PERSISTENCE_NOT_FOUND",
            Self::PendingMigrationExists { .. } => "PERSISTENCE_PENDING_EXISTS",
        }
    }

    /// Whether retrying the same call can reasonably succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Transaction { .. })
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for PersistenceError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => Self::not_found("row"),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::connection(error.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::serialization(error.to_string())
            }
            _ => Self::query(error.to_string()),
        }
    }
}

#[cfg(feature = "database")]
impl From<serde_json::Error> for PersistenceError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string())
    }
}

/// Persistence operation result
pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            PersistenceError::pending_migration_exists("p1").error_code(),
            "PERSISTENCE_PENDING_EXISTS"
        );
        assert_eq!(PersistenceError::query("boom").error_code(), "PERSISTENCE_QUERY_ERROR");
    }

    #[test]
    fn connection_errors_are_transient() {
        assert!(PersistenceError::connection("refused").is_transient());
        assert!(!PersistenceError::not_found("migration").is_transient());
    }
}
