//! Audit logging
//!
//! After each successful insert/update/delete row, when listening is active
//! for the entity's table, an audit record is written through the same
//! session as the triggering change, so both commit or roll back together.
//!
//! Listening is an explicit per-table registration: [`attach_listeners`] /
//! [`detach_listeners`] toggle it, and [`listeners_disabled`] suppresses it
//! for a scope, restoring on drop regardless of success or failure. The
//! write path is an [`AuditSink`]; the default sink inserts into the
//! caller-provisioned `audit_logs` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::OrmResult;
use crate::model::{FieldMap, Model};
use crate::session::Session;

/// Operation kind captured in an audit record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOperation {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOperation::Insert => write!(f, "insert"),
            AuditOperation::Update => write!(f, "update"),
            AuditOperation::Delete => write!(f, "delete"),
        }
    }
}

/// One change record: which table, what happened, when, and a snapshot of
/// the affected row. Never mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub table_name: String,
    pub operation: AuditOperation,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

/// Destination for audit entries
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, session: &Session, entry: AuditEntry) -> OrmResult<()>;
}

/// Default sink: inserts into the `audit_logs` table through the session of
/// the triggering change
pub struct TableAuditSink;

#[async_trait]
impl AuditSink for TableAuditSink {
    async fn record(&self, session: &Session, entry: AuditEntry) -> OrmResult<()> {
        let sql = "INSERT INTO audit_logs (table_name, operation, timestamp, data) \
                   VALUES ($1, $2, $3::timestamptz, $4)";
        let params = [
            json!(entry.table_name),
            json!(entry.operation.to_string()),
            json!(entry.timestamp.to_rfc3339()),
            entry.data,
        ];
        session.execute(sql, &params).await?;
        Ok(())
    }
}

static SINK: Lazy<RwLock<Arc<dyn AuditSink>>> =
    Lazy::new(|| RwLock::new(Arc::new(TableAuditSink) as Arc<dyn AuditSink>));

/// Replace the audit destination process-wide
pub fn set_audit_sink(sink: Arc<dyn AuditSink>) {
    let mut guard = SINK.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = sink;
}

#[derive(Debug, Default)]
struct ListenerState {
    attached: bool,
    disabled_depth: u32,
}

static LISTENERS: Lazy<DashMap<&'static str, ListenerState>> = Lazy::new(DashMap::new);

/// Start auditing mutations of this model's table
pub fn attach_listeners<M: Model>() {
    LISTENERS.entry(M::table_name()).or_default().attached = true;
}

/// Stop auditing mutations of this model's table
pub fn detach_listeners<M: Model>() {
    if let Some(mut state) = LISTENERS.get_mut(M::table_name()) {
        state.attached = false;
    }
}

/// Whether mutations of this model's table are currently audited
pub fn listeners_attached<M: Model>() -> bool {
    LISTENERS
        .get(M::table_name())
        .map(|state| state.attached && state.disabled_depth == 0)
        .unwrap_or(false)
}

/// Suppress auditing for this model's table until the guard drops. Scopes
/// nest; listening resumes when the outermost guard drops, on success,
/// error, and panic alike.
pub fn listeners_disabled<M: Model>() -> DisabledListeners {
    LISTENERS.entry(M::table_name()).or_default().disabled_depth += 1;
    DisabledListeners {
        table: M::table_name(),
    }
}

/// Guard returned by [`listeners_disabled`]
#[must_use = "listening resumes as soon as the guard drops"]
pub struct DisabledListeners {
    table: &'static str,
}

impl Drop for DisabledListeners {
    fn drop(&mut self) {
        if let Some(mut state) = LISTENERS.get_mut(self.table) {
            state.disabled_depth = state.disabled_depth.saturating_sub(1);
        }
    }
}

/// Write one audit record for a mutation of `M`, if listening is active
pub(crate) async fn record<M: Model>(
    session: &Session,
    operation: AuditOperation,
    snapshot: Value,
) -> OrmResult<()> {
    if !listeners_attached::<M>() {
        return Ok(());
    }
    let entry = AuditEntry {
        table_name: M::table_name().to_string(),
        operation,
        timestamp: Utc::now(),
        data: snapshot,
    };
    tracing::debug!(table = %entry.table_name, operation = %entry.operation, "audit record");
    let sink = {
        let guard = SINK.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    };
    sink.record(session, entry).await
}

/// The audit record as an entity, for reading `audit_logs` back through the
/// model facade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Option<i64>,
    pub table_name: String,
    pub operation: String,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

impl Model for AuditLog {
    type PrimaryKey = i64;

    fn table_name() -> &'static str {
        "audit_logs"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "table_name", "operation", "timestamp", "data"]
    }

    fn primary_key(&self) -> Option<i64> {
        self.id
    }

    fn set_primary_key(&mut self, key: i64) {
        self.id = Some(key);
    }

    fn from_row(row: &PgRow) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            table_name: row.try_get("table_name")?,
            operation: row.try_get("operation")?,
            timestamp: row.try_get("timestamp")?,
            data: row.try_get("data")?,
        })
    }

    fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        if let Some(id) = self.id {
            fields.insert("id".to_string(), json!(id));
        }
        fields.insert("table_name".to_string(), json!(self.table_name));
        fields.insert("operation".to_string(), json!(self.operation));
        fields.insert("timestamp".to_string(), json!(self.timestamp.to_rfc3339()));
        fields.insert("data".to_string(), self.data.clone());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests run concurrently and the registry is process-wide, so each test
    // addresses its own table through its own probe type.
    macro_rules! probe_model {
        ($name:ident, $table:literal) => {
            #[derive(Debug, Clone, Serialize, Deserialize)]
            struct $name;

            impl Model for $name {
                type PrimaryKey = i64;

                fn table_name() -> &'static str {
                    $table
                }

                fn columns() -> &'static [&'static str] {
                    &["id"]
                }

                fn primary_key(&self) -> Option<i64> {
                    None
                }

                fn set_primary_key(&mut self, _key: i64) {}

                fn from_row(_row: &PgRow) -> OrmResult<Self> {
                    Ok($name)
                }

                fn to_fields(&self) -> FieldMap {
                    FieldMap::new()
                }
            }
        };
    }

    probe_model!(AttachProbe, "audit_attach_probe");
    probe_model!(DisableProbe, "audit_disable_probe");
    probe_model!(PanicProbe, "audit_panic_probe");

    #[test]
    fn attach_detach_lifecycle() {
        assert!(!listeners_attached::<AttachProbe>());
        attach_listeners::<AttachProbe>();
        assert!(listeners_attached::<AttachProbe>());
        detach_listeners::<AttachProbe>();
        assert!(!listeners_attached::<AttachProbe>());
    }

    #[test]
    fn disabled_scope_suppresses_and_restores() {
        attach_listeners::<DisableProbe>();
        {
            let _guard = listeners_disabled::<DisableProbe>();
            assert!(!listeners_attached::<DisableProbe>());
            {
                let _inner = listeners_disabled::<DisableProbe>();
                assert!(!listeners_attached::<DisableProbe>());
            }
            // still suppressed: the outer guard is alive
            assert!(!listeners_attached::<DisableProbe>());
        }
        assert!(listeners_attached::<DisableProbe>());
        detach_listeners::<DisableProbe>();
    }

    #[test]
    fn disabled_scope_restores_on_panic() {
        attach_listeners::<PanicProbe>();
        let result = std::panic::catch_unwind(|| {
            let _guard = listeners_disabled::<PanicProbe>();
            panic!("boom");
        });
        assert!(result.is_err());
        assert!(listeners_attached::<PanicProbe>());
        detach_listeners::<PanicProbe>();
    }

    #[test]
    fn operation_kind_renders_lowercase() {
        assert_eq!(AuditOperation::Insert.to_string(), "insert");
        assert_eq!(AuditOperation::Update.to_string(), "update");
        assert_eq!(AuditOperation::Delete.to_string(), "delete");
    }
}
