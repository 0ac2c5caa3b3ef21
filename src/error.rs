//! Error types for ormkit
//!
//! One crate-level error enum covering configuration, validation, usage,
//! constraint, and transport faults. Constraint violations are classified
//! out of the driver error so callers can distinguish a rejected write from
//! a broken connection.

use thiserror::Error;

/// Result type alias for all ormkit operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error type for all ormkit operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// Session provider missing, already initialized, or otherwise unusable.
    /// Fatal: must be fixed by the caller, never retried automatically.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Caller-supplied data failed shape or type checks; the operation was
    /// not attempted.
    #[error("validation error: {0}")]
    Validation(String),

    /// The database rejected a write (unique, not-null, foreign key).
    /// Surfaced verbatim after rollback; never retried automatically.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A filter, order-by, or loader named a field the model does not declare
    #[error("{table} has no field '{field}'")]
    UnknownField { table: &'static str, field: String },

    /// Invalid argument (negative offset, non-positive page/per_page, ...);
    /// fails fast before any I/O
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Query construction error
    #[error("query error: {0}")]
    Query(String),

    /// Transaction lifecycle error
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Row/snapshot serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Connection or statement execution error; propagated after rollback.
    /// Retry policy, if any, belongs to the caller.
    #[error("database error: {0}")]
    Database(String),

    /// Record not found where one was required
    #[error("record not found in table '{0}'")]
    NotFound(String),
}

impl From<sqlx::Error> for OrmError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => {
                if db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation()
                {
                    return OrmError::Constraint(db.to_string());
                }
                // not-null violations carry SQLSTATE 23502 but have no
                // dedicated predicate on sqlx's DatabaseError
                if db.code().as_deref() == Some("23502") {
                    return OrmError::Constraint(db.to_string());
                }
                OrmError::Database(db.to_string())
            }
            sqlx::Error::RowNotFound => OrmError::NotFound(err.to_string()),
            _ => OrmError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for OrmError {
    fn from(err: serde_json::Error) -> Self {
        OrmError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for OrmError {
    fn from(err: anyhow::Error) -> Self {
        OrmError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_field_and_table() {
        let err = OrmError::UnknownField {
            table: "users",
            field: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "users has no field 'nope'");
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: OrmError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, OrmError::NotFound(_)));
    }

    #[test]
    fn serde_errors_map_to_serialization() {
        let bad = serde_json::from_str::<serde_json::Value>("{");
        let err: OrmError = bad.unwrap_err().into();
        assert!(matches!(err, OrmError::Serialization(_)));
    }
}
