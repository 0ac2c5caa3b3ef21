//! DML operations (INSERT, UPDATE, DELETE)

use serde_json::Value;

use super::builder::QueryBuilder;
use super::types::{QueryType, SetClause, SetValue};
use crate::model::FieldMap;

impl<M> QueryBuilder<M> {
    /// Start an INSERT statement
    pub fn insert_into(mut self, table: &str) -> Self {
        self.query_type = QueryType::Insert;
        self.table = Some(table.to_string());
        self
    }

    /// Start an UPDATE statement
    pub fn update(mut self, table: &str) -> Self {
        self.query_type = QueryType::Update;
        self.table = Some(table.to_string());
        self
    }

    /// Start a DELETE statement
    pub fn delete_from(mut self, table: &str) -> Self {
        self.query_type = QueryType::Delete;
        self.table = Some(table.to_string());
        self
    }

    /// Assign a bound value to a column
    pub fn set<T: Into<Value>>(mut self, column: &str, value: T) -> Self {
        let value = value.into();
        let value = match value {
            Value::Null => SetValue::Null,
            other => SetValue::Bound(other),
        };
        self.set_clauses.push(SetClause {
            column: column.to_string(),
            value,
        });
        self
    }

    /// Assign literal NULL to a column
    pub fn set_null(mut self, column: &str) -> Self {
        self.set_clauses.push(SetClause {
            column: column.to_string(),
            value: SetValue::Null,
        });
        self
    }

    /// Assign a raw SQL expression to a column, e.g. `now()`
    pub fn set_raw(mut self, column: &str, expression: &'static str) -> Self {
        self.set_clauses.push(SetClause {
            column: column.to_string(),
            value: SetValue::Raw(expression),
        });
        self
    }

    /// Assign every entry of a field map in its (deterministic) order
    pub fn set_fields(mut self, fields: &FieldMap) -> Self {
        for (column, value) in fields {
            self = self.set(column, value.clone());
        }
        self
    }

    /// Append a RETURNING clause
    pub fn returning(mut self, expression: &str) -> Self {
        self.returning = Some(expression.to_string());
        self
    }
}
