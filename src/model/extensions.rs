//! Utility operations — primary-key lookups, instance persistence, and
//! scoped transactions

use std::future::Future;

use crate::audit::{self, AuditOperation};
use crate::error::{OrmError, OrmResult};
use crate::query::{Filter, QueryBuilder};
use crate::session::{with_session, Session};

use super::core_trait::Model;
use super::selects::QueryMethods;

/// Extension trait with convenience operations built on the facade
pub trait ModelExtensions: Model {
    /// Look up a record by primary key under default visibility
    async fn find(id: Self::PrimaryKey, session: Option<Session>) -> OrmResult<Option<Self>>
    where
        Self: Sized,
    {
        let key = serde_json::to_value(&id)?;
        let builder =
            <Self as QueryMethods>::query().filter(Filter::eq(Self::primary_key_name(), key));
        with_session(session, move |session| async move {
            builder.first(&session).await
        })
        .await
    }

    /// Look up a record by primary key, failing when absent
    async fn find_or_fail(id: Self::PrimaryKey, session: Option<Session>) -> OrmResult<Self>
    where
        Self: Sized,
    {
        Self::find(id, session)
            .await?
            .ok_or_else(|| OrmError::NotFound(Self::table_name().to_string()))
    }

    /// Persist this instance within the current scope: update by primary key
    /// when one is assigned and the row exists, insert otherwise. The
    /// instance is refreshed from the stored row. When an ambient session is
    /// active the enclosing scope commits; otherwise this call owns its
    /// scope and commits itself.
    async fn apply(&mut self, session: Option<Session>) -> OrmResult<()>
    where
        Self: Sized,
    {
        let fields = self.to_fields();
        Self::validate_fields(&fields)?;
        let key = self.primary_key();

        let stored = with_session(session, move |session| async move {
            if let Some(key) = key {
                let key = serde_json::to_value(&key)?;
                let mut data = fields.clone();
                data.remove(Self::primary_key_name());
                if !data.is_empty() || Self::uses_timestamps() {
                    let mut builder = QueryBuilder::<Self>::new()
                        .update(Self::table_name())
                        .set_fields(&data);
                    if Self::uses_timestamps() && !data.contains_key("updated_at") {
                        builder = builder.set_raw("updated_at", "now()");
                    }
                    let (sql, params) = builder
                        .filter(Filter::eq(Self::primary_key_name(), key))
                        .returning("*")
                        .to_sql_with_params();
                    if let Some(row) = session.fetch_optional(&sql, &params).await? {
                        let model = Self::from_row(&row)?;
                        audit::record::<Self>(
                            &session,
                            AuditOperation::Update,
                            serde_json::to_value(&model)?,
                        )
                        .await?;
                        return Ok(model);
                    }
                }
            }

            let mut builder = QueryBuilder::<Self>::new()
                .insert_into(Self::table_name())
                .set_fields(&fields);
            if Self::uses_timestamps() {
                if !fields.contains_key("created_at") {
                    builder = builder.set_raw("created_at", "now()");
                }
                if !fields.contains_key("updated_at") {
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
        .await?;

        *self = stored;
        Ok(())
    }

    /// Persist every instance within one scope
    async fn apply_all(models: &mut [Self], session: Option<Session>) -> OrmResult<()>
    where
        Self: Sized,
    {
        for model in models.iter() {
            Self::validate_fields(&model.to_fields())?;
        }
        with_session(session, move |_session| async move {
            for model in models.iter_mut() {
                model.apply(None).await?;
            }
            Ok(())
        })
        .await
    }

    /// Run a closure of operations inside one scoped transaction
    async fn transactional<F, Fut, R>(operations: F, session: Option<Session>) -> OrmResult<R>
    where
        Self: Sized,
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = OrmResult<R>>,
    {
        with_session(session, operations).await
    }
}

impl<T: Model> ModelExtensions for T {}
