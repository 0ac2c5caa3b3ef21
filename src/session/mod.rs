//! Session management
//!
//! A [`Session`] owns one database transaction and bounds one unit of work.
//! Sessions are acquired through [`with_session`], which reuses an explicit
//! or ambient session when one exists and otherwise opens its own, with
//! commit-on-success / rollback-on-failure and release on every exit path.

pub mod context;
pub mod scope;

pub use context::current;
pub use scope::with_session;

use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Pool, Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{OrmError, OrmResult};

/// Handle to one open transaction.
///
/// Cloning shares the same underlying transaction; the handle is owned by the
/// scope that opened it and must not be handed to another task. If the scope
/// exits without an explicit commit or rollback, dropping the inner sqlx
/// transaction rolls it back.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session by beginning a transaction on the given pool
    pub async fn begin(pool: &Pool<Postgres>) -> OrmResult<Self> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| OrmError::Transaction(format!("failed to begin transaction: {}", e)))?;
        tracing::debug!("session opened");
        Ok(Self {
            inner: Arc::new(Mutex::new(Some(tx))),
        })
    }

    /// Run a statement and return all rows
    pub async fn fetch_all(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<PgRow>> {
        let mut guard = self.inner.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| OrmError::Transaction("session is closed".to_string()))?;
        let rows = bind_params(sqlx::query(sql), params)
            .fetch_all(&mut **tx)
            .await?;
        Ok(rows)
    }

    /// Run a statement and return at most one row
    pub async fn fetch_optional(&self, sql: &str, params: &[Value]) -> OrmResult<Option<PgRow>> {
        let mut guard = self.inner.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| OrmError::Transaction("session is closed".to_string()))?;
        let row = bind_params(sqlx::query(sql), params)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row)
    }

    /// Run a statement and return exactly one row
    pub async fn fetch_one(&self, sql: &str, params: &[Value]) -> OrmResult<PgRow> {
        let mut guard = self.inner.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| OrmError::Transaction("session is closed".to_string()))?;
        let row = bind_params(sqlx::query(sql), params)
            .fetch_one(&mut **tx)
            .await?;
        Ok(row)
    }

    /// Run a statement and return the number of affected rows
    pub async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        let mut guard = self.inner.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| OrmError::Transaction("session is closed".to_string()))?;
        let result = bind_params(sqlx::query(sql), params)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub(crate) async fn commit(&self) -> OrmResult<()> {
        let mut guard = self.inner.lock().await;
        let tx = guard
            .take()
            .ok_or_else(|| OrmError::Transaction("session already released".to_string()))?;
        tx.commit()
            .await
            .map_err(|e| OrmError::Transaction(format!("failed to commit: {}", e)))?;
        tracing::debug!("session committed");
        Ok(())
    }

    pub(crate) async fn rollback(&self) -> OrmResult<()> {
        let mut guard = self.inner.lock().await;
        let tx = guard
            .take()
            .ok_or_else(|| OrmError::Transaction("session already released".to_string()))?;
        tx.rollback()
            .await
            .map_err(|e| OrmError::Transaction(format!("failed to rollback: {}", e)))?;
        tracing::debug!("session rolled back");
        Ok(())
    }
}

/// Bind serde_json values to a query in order, dispatching on the JSON type.
/// Objects and arrays bind as JSONB.
fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [Value],
) -> Query<'q, Postgres, PgArguments> {
    for value in params {
        query = match value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    query.bind(i)
                } else if let Some(f) = n.as_f64() {
                    query.bind(f)
                } else {
                    query.bind(n.to_string())
                }
            }
            Value::String(s) => query.bind(s.as_str()),
            Value::Array(_) | Value::Object(_) => query.bind(sqlx::types::Json(value.clone())),
        };
    }
    query
}
