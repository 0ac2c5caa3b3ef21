//! Mutating operations — create, update, delete, their bulk variants, and
//! soft delete
//!
//! Every operation validates its inputs before any I/O, then runs inside
//! [`with_session`]: reused sessions leave commit/rollback to the outer
//! scope, owned sessions commit on success and roll back on failure. Audit
//! records are written per affected row through the same session, so they
//! commit atomically with the triggering change.

use serde_json::Value;

use crate::audit::{self, AuditOperation};
use crate::error::{OrmError, OrmResult};
use crate::query::{Filter, QueryBuilder};
use crate::session::{with_session, Session};

use super::core_trait::{validate_filters, FieldMap, Model};

/// Trait providing mutating operations for models
pub trait CrudOperations: Model {
    /// Insert one row and return the stored instance with its assigned
    /// primary key. Constraint violations surface after rollback.
    async fn create(data: FieldMap, session: Option<Session>) -> OrmResult<Self>
    where
        Self: Sized,
    {
        Self::validate_fields(&data)?;
        with_session(session, move |session| async move {
            let mut builder = QueryBuilder::<Self>::new()
                .insert_into(Self::table_name())
                .set_fields(&data);
            if Self::uses_timestamps() {
                if !data.contains_key("created_at") {
                    builder = builder.set_raw("created_at", "now()");
                }
                if !data.contains_key("updated_at") {
                    builder = builder.set_raw("updated_at", "now()");
                }
            }
            let (sql, params) = builder.returning("*").to_sql_with_params();
            let row = session.fetch_one(&sql, &params).await?;
            let model = Self::from_row(&row)?;
            audit::record::<Self>(&session, AuditOperation::Insert, serde_json::to_value(&model)?)
                .await?;
            Ok(model)
        })
        .await
    }

    /// Insert several rows, one statement each, inside one scope
    async fn bulk_create(rows: Vec<FieldMap>, session: Option<Session>) -> OrmResult<Vec<Self>>
    where
        Self: Sized,
    {
        for data in &rows {
            Self::validate_fields(data)?;
        }
        with_session(session, move |_session| async move {
            let mut created = Vec::with_capacity(rows.len());
            for data in rows {
                created.push(Self::create(data, None).await?);
            }
            Ok(created)
        })
        .await
    }

    /// Update every matching row and return their primary keys. Zero matches
    /// is a normal outcome and yields an empty list.
    async fn update(
        data: FieldMap,
        filters: Vec<Filter>,
        session: Option<Session>,
    ) -> OrmResult<Vec<Self::PrimaryKey>>
    where
        Self: Sized,
    {
        if data.is_empty() && !Self::uses_timestamps() {
            return Err(OrmError::InvalidArgument(
                "update requires at least one field".to_string(),
            ));
        }
        Self::validate_fields(&data)?;
        validate_filters::<Self>(&filters)?;
        with_session(session, move |session| async move {
            let mut builder = QueryBuilder::<Self>::new()
                .update(Self::table_name())
                .set_fields(&data);
            if Self::uses_timestamps() && !data.contains_key("updated_at") {
                builder = builder.set_raw("updated_at", "now()");
            }
            let (sql, params) = builder.filters(filters).returning("*").to_sql_with_params();
            let rows = session.fetch_all(&sql, &params).await?;

            let mut keys = Vec::with_capacity(rows.len());
            for row in &rows {
                let model = Self::from_row(row)?;
                audit::record::<Self>(
                    &session,
                    AuditOperation::Update,
                    serde_json::to_value(&model)?,
                )
                .await?;
                if let Some(key) = model.primary_key() {
                    keys.push(key);
                }
            }
            Ok(keys)
        })
        .await
    }

    /// Same contract as [`CrudOperations::update`]
    async fn bulk_update(
        data: FieldMap,
        filters: Vec<Filter>,
        session: Option<Session>,
    ) -> OrmResult<Vec<Self::PrimaryKey>>
    where
        Self: Sized,
    {
        Self::update(data, filters, session).await
    }

    /// Delete every matching row and return the count
    async fn delete(filters: Vec<Filter>, session: Option<Session>) -> OrmResult<u64>
    where
        Self: Sized,
    {
        validate_filters::<Self>(&filters)?;
        with_session(session, move |session| async move {
            let (sql, params) = QueryBuilder::<Self>::new()
                .delete_from(Self::table_name())
                .filters(filters)
                .returning("*")
                .to_sql_with_params();
            let rows = session.fetch_all(&sql, &params).await?;
            for row in &rows {
                let model = Self::from_row(row)?;
                audit::record::<Self>(
                    &session,
                    AuditOperation::Delete,
                    serde_json::to_value(&model)?,
                )
                .await?;
            }
            Ok(rows.len() as u64)
        })
        .await
    }

    /// Run one delete statement per filter set and return the aggregate
    /// count. All sets share one scope: when this call owns the session, a
    /// fault partway through rolls back every set.
    async fn bulk_delete(
        filter_sets: Vec<Vec<Filter>>,
        session: Option<Session>,
    ) -> OrmResult<u64>
    where
        Self: Sized,
    {
        for filters in &filter_sets {
            validate_filters::<Self>(filters)?;
        }
        with_session(session, move |_session| async move {
            let mut total = 0u64;
            for filters in filter_sets {
                total += Self::delete(filters, None).await?;
            }
            Ok(total)
        })
        .await
    }

    /// Mark matching rows deleted by setting the soft-delete flag through
    /// the update path. A usage fault when the model declares no flag.
    async fn soft_delete(
        filters: Vec<Filter>,
        session: Option<Session>,
    ) -> OrmResult<Vec<Self::PrimaryKey>>
    where
        Self: Sized,
    {
        let Some(column) = Self::soft_delete_column() else {
            return Err(OrmError::InvalidArgument(format!(
                "{} does not declare a soft-delete column",
                Self::table_name()
            )));
        };
        let mut data = FieldMap::new();
        data.insert(column.to_string(), Value::Bool(true));
        Self::update(data, filters, session).await
    }
}

impl<T: Model> CrudOperations for T {}
