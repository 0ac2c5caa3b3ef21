//! Core Model trait — schema metadata and conversion contract for entities

use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::postgres::PgRow;

use crate::error::{OrmError, OrmResult};
use crate::loading::Relation;

/// Ordered field-value mapping. Ordering keeps generated SQL deterministic.
pub type FieldMap = BTreeMap<String, Value>;

/// Trait for database entities.
///
/// Declares the mapped table, columns, primary key, and the optional
/// soft-delete, timestamp, and relationship capabilities the facade keys its
/// behavior on. `from_row` and `to_fields` are the row/field conversion
/// contract; a derive macro could generate them, here they are written by
/// hand.
pub trait Model: Send + Sync + Debug + Serialize + for<'de> Deserialize<'de> {
    /// The type of this model's primary key
    type PrimaryKey: Clone + Send + Sync + Debug + Display + Serialize;

    /// Mapped table name
    fn table_name() -> &'static str;

    /// Declared column names; filters, order-by, and field maps are checked
    /// against this list
    fn columns() -> &'static [&'static str];

    /// Primary key column name
    fn primary_key_name() -> &'static str {
        "id"
    }

    /// Primary key of this instance, if assigned
    fn primary_key(&self) -> Option<Self::PrimaryKey>;

    /// Assign the primary key on this instance
    fn set_primary_key(&mut self, key: Self::PrimaryKey);

    /// Whether this model maintains `created_at`/`updated_at` columns
    fn uses_timestamps() -> bool {
        false
    }

    /// The boolean soft-delete flag column, when the model opts in. A `true`
    /// value marks the row deleted; reads exclude such rows by default.
    fn soft_delete_column() -> Option<&'static str> {
        None
    }

    /// Declared relationships, resolved by eager-load directives
    fn relations() -> &'static [Relation] {
        &[]
    }

    /// Hydrate an instance from a database row
    fn from_row(row: &PgRow) -> OrmResult<Self>
    where
        Self: Sized;

    /// Convert this instance to a field-value mapping
    fn to_fields(&self) -> FieldMap;

    /// Store rows fetched for a relationship. Models without relationship
    /// storage ignore the call.
    fn set_loaded(&mut self, _relation: &str, _rows: Vec<Value>) {}

    /// Relationship rows previously attached by the loader
    fn loaded(&self) -> Option<&BTreeMap<String, Vec<Value>>> {
        None
    }

    /// Shape check invoked before persisting a field mapping. The default
    /// rejects fields the model does not declare; overrides add their own
    /// checks and report mismatches as a validation fault.
    fn validate_fields(data: &FieldMap) -> OrmResult<()>
    where
        Self: Sized,
    {
        for field in data.keys() {
            if !Self::columns().iter().any(|c| *c == field.as_str()) {
                return Err(OrmError::UnknownField {
                    table: Self::table_name(),
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Check every filter column against the model's declared schema.
/// Table-qualified names (`posts.user_id`) pass through; they reference
/// joined tables whose schema this model does not declare.
pub(crate) fn validate_filters<M: Model>(
    filters: &[crate::query::Filter],
) -> OrmResult<()> {
    for filter in filters {
        let column = filter.column();
        if column.contains('.') {
            continue;
        }
        if !M::columns().iter().any(|c| *c == column) {
            return Err(OrmError::UnknownField {
                table: M::table_name(),
                field: column.to_string(),
            });
        }
    }
    Ok(())
}
