//! Statement execution against a session

use serde_json::Value;
use sqlx::Row;

use super::builder::QueryBuilder;
use super::row;
use crate::error::{OrmError, OrmResult};
use crate::model::Model;
use crate::session::Session;

/// Result shape requested from [`QueryBuilder::fetch`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FetchMode {
    /// First column of the first row
    Scalar,
    /// First column of every row
    Scalars,
    /// Every row as a value tuple
    Rows,
}

/// Shaped result of a fetched statement
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Scalar(Value),
    Scalars(Vec<Value>),
    Rows(Vec<Vec<Value>>),
}

impl Fetched {
    pub fn into_scalar(self) -> Option<Value> {
        match self {
            Fetched::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_scalars(self) -> Option<Vec<Value>> {
        match self {
            Fetched::Scalars(values) => Some(values),
            _ => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<Vec<Value>>> {
        match self {
            Fetched::Rows(rows) => Some(rows),
            _ => None,
        }
    }
}

impl<M: Model> QueryBuilder<M> {
    /// Execute and hydrate whole-entity instances
    pub async fn get(self, session: &Session) -> OrmResult<Vec<M>> {
        let (sql, params) = self.to_sql_with_params();
        let rows = session.fetch_all(&sql, &params).await?;
        rows.iter().map(M::from_row).collect()
    }

    /// Execute and hydrate the first matching instance
    pub async fn first(self, session: &Session) -> OrmResult<Option<M>> {
        let (sql, params) = self.limit(1).to_sql_with_params();
        let maybe_row = session.fetch_optional(&sql, &params).await?;
        maybe_row.as_ref().map(M::from_row).transpose()
    }

    /// Execute as a COUNT over the same filters
    pub async fn count(mut self, session: &Session) -> OrmResult<i64> {
        self.select_fields = vec!["COUNT(*)".to_string()];
        self.order_by.clear();
        self.limit_count = None;
        self.offset_value = None;
        let (sql, params) = self.to_sql_with_params();
        let row = session.fetch_one(&sql, &params).await?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| OrmError::Database(format!("failed to read count: {}", e)))?;
        Ok(count)
    }
}

impl<M> QueryBuilder<M> {
    /// Execute and decode every row into a value tuple
    pub async fn fetch_values(self, session: &Session) -> OrmResult<Vec<Vec<Value>>> {
        let (sql, params) = self.to_sql_with_params();
        let rows = session.fetch_all(&sql, &params).await?;
        rows.iter().map(row::values).collect()
    }

    /// Execute with an explicit result shape
    pub async fn fetch(self, session: &Session, mode: FetchMode) -> OrmResult<Fetched> {
        let (sql, params) = self.to_sql_with_params();
        let rows = session.fetch_all(&sql, &params).await?;
        match mode {
            FetchMode::Scalar => {
                let value = match rows.first() {
                    Some(row) => row::value_at(row, 0)?,
                    None => Value::Null,
                };
                Ok(Fetched::Scalar(value))
            }
            FetchMode::Scalars => {
                let values = rows
                    .iter()
                    .map(|row| row::value_at(row, 0))
                    .collect::<OrmResult<Vec<_>>>()?;
                Ok(Fetched::Scalars(values))
            }
            FetchMode::Rows => {
                let tuples = rows.iter().map(row::values).collect::<OrmResult<Vec<_>>>()?;
                Ok(Fetched::Rows(tuples))
            }
        }
    }
}
