//! # ormkit: active-record helpers over sqlx
//!
//! Classmethod-style CRUD, filtering, pagination, soft deletes, and audit
//! logging for hand-declared Postgres entities. The crate supplies the
//! query-construction and session-lifecycle logic; sqlx supplies the
//! driver, pool, and wire protocol.
//!
//! Operations accept an optional explicit [`session::Session`] and
//! otherwise consult the task-scoped ambient session, opening (and
//! committing or rolling back) their own transaction only when neither
//! exists.

#![allow(async_fn_in_trait)]

pub mod audit;
pub mod database;
pub mod error;
pub mod loading;
pub mod model;
pub mod pagination;
pub mod query;
pub mod session;

// Re-export the core surface
pub use audit::{
    attach_listeners, detach_listeners, listeners_attached, listeners_disabled, set_audit_sink,
    AuditEntry, AuditLog, AuditOperation, AuditSink, DisabledListeners, TableAuditSink,
};
pub use database::{connect, init_pool, DatabaseConfig};
pub use error::{OrmError, OrmResult};
pub use loading::{Relation, RelationKind};
pub use model::{
    CrudOperations, FieldMap, Model, ModelDocument, ModelExtensions, QueryMethods, SelectOptions,
};
pub use pagination::PaginationResult;
pub use query::{Fetched, FetchMode, Filter, Join, JoinType, OrderDirection, QueryBuilder};
pub use session::{with_session, Session};
