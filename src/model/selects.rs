//! Read operations — single/collection selects, projections, joins,
//! counting, and pagination

use serde_json::Value;

use crate::error::{OrmError, OrmResult};
use crate::loading;
use crate::pagination::PaginationResult;
use crate::query::{parse_order_specs, Fetched, FetchMode, Filter, Join, QueryBuilder};
use crate::session::{with_session, Session};

use super::core_trait::{validate_filters, FieldMap, Model};

/// Options shared by the read operations
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// Field names, `-` prefix for descending
    pub order_by: Vec<String>,
    /// Relationship names to eager-load in batched secondary selects
    pub load_with: Vec<String>,
    /// Include rows whose soft-delete flag is set
    pub include_inactive: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Trait providing read operations for models
pub trait QueryMethods: Model {
    /// Base query for this model with the default soft-delete visibility
    /// filter applied
    fn query() -> QueryBuilder<Self>
    where
        Self: Sized,
    {
        Self::visible_query(false)
    }

    /// Base query with explicit visibility. The implicit filter is appended
    /// only when the model declares a soft-delete column and inactive rows
    /// were not requested.
    fn visible_query(include_inactive: bool) -> QueryBuilder<Self>
    where
        Self: Sized,
    {
        let builder = QueryBuilder::new().from(Self::table_name());
        match Self::soft_delete_column() {
            Some(column) if !include_inactive => builder.filter(Filter::eq(column, false)),
            _ => builder,
        }
    }

    /// Translate a field-value mapping into validated equality filters
    fn build_filters(fields: &FieldMap) -> OrmResult<Vec<Filter>>
    where
        Self: Sized,
    {
        let mut filters = Vec::with_capacity(fields.len());
        for (field, value) in fields {
            if !Self::columns().iter().any(|c| *c == field.as_str()) {
                return Err(OrmError::UnknownField {
                    table: Self::table_name(),
                    field: field.clone(),
                });
            }
            filters.push(Filter::eq(field, value.clone()));
        }
        Ok(filters)
    }

    /// Fetch the first matching record. Absence is a normal outcome.
    async fn select_one(
        filters: Vec<Filter>,
        opts: SelectOptions,
        session: Option<Session>,
    ) -> OrmResult<Option<Self>>
    where
        Self: Sized,
    {
        let builder = assemble::<Self>(filters, &opts)?;
        with_session(session, move |session| async move {
            let mut found = builder.first(&session).await?;
            if let Some(model) = found.as_mut() {
                if !opts.load_with.is_empty() {
                    loading::load_related(&session, std::slice::from_mut(model), &opts.load_with)
                        .await?;
                }
            }
            Ok(found)
        })
        .await
    }

    /// Fetch every matching record in order
    async fn select_all(
        filters: Vec<Filter>,
        opts: SelectOptions,
        session: Option<Session>,
    ) -> OrmResult<Vec<Self>>
    where
        Self: Sized,
    {
        let builder = assemble::<Self>(filters, &opts)?;
        with_session(session, move |session| async move {
            let mut models = builder.get(&session).await?;
            if !opts.load_with.is_empty() {
                loading::load_related(&session, &mut models, &opts.load_with).await?;
            }
            Ok(models)
        })
        .await
    }

    /// Fetch an explicit column projection as value tuples
    async fn select_columns(
        columns: &[&str],
        filters: Vec<Filter>,
        opts: SelectOptions,
        session: Option<Session>,
    ) -> OrmResult<Vec<Vec<Value>>>
    where
        Self: Sized,
    {
        if columns.is_empty() {
            return Err(OrmError::InvalidArgument(
                "column projection requires at least one column".to_string(),
            ));
        }
        for column in columns {
            if !column.contains('.') && !Self::columns().iter().any(|c| c == column) {
                return Err(OrmError::UnknownField {
                    table: Self::table_name(),
                    field: column.to_string(),
                });
            }
        }
        let builder = assemble::<Self>(filters, &opts)?.columns(columns);
        with_session(session, move |session| async move {
            builder.fetch_values(&session).await
        })
        .await
    }

    /// Fetch across joined tables. Joins apply in order and require an
    /// explicit column projection; there is no unambiguous whole-entity
    /// result over multiple tables.
    async fn select_with_joins(
        joins: Vec<Join>,
        columns: &[&str],
        filters: Vec<Filter>,
        opts: SelectOptions,
        session: Option<Session>,
    ) -> OrmResult<Vec<Vec<Value>>>
    where
        Self: Sized,
    {
        if columns.is_empty() {
            return Err(OrmError::InvalidArgument(
                "joined selects require explicit columns".to_string(),
            ));
        }
        validate_filters::<Self>(&filters)?;
        validate_options(&opts)?;
        let order_pairs = parse_order_specs(Self::table_name(), Self::columns(), &opts.order_by)?;
        let mut builder = QueryBuilder::<Self>::new()
            .from(Self::table_name())
            .columns(columns)
            .filters(filters)
            .order_by_pairs(order_pairs);
        for join in joins {
            builder = builder.join(join);
        }
        if let Some(limit) = opts.limit {
            builder = builder.limit(limit);
        }
        if let Some(offset) = opts.offset {
            builder = builder.offset(offset);
        }
        with_session(session, move |session| async move {
            builder.fetch_values(&session).await
        })
        .await
    }

    /// Count matching rows under the same visibility rules as the selects,
    /// so pagination totals agree with item visibility
    async fn get_count(
        filters: Vec<Filter>,
        include_inactive: bool,
        session: Option<Session>,
    ) -> OrmResult<i64>
    where
        Self: Sized,
    {
        validate_filters::<Self>(&filters)?;
        let builder = Self::visible_query(include_inactive).filters(filters);
        with_session(session, move |session| async move {
            builder.count(&session).await
        })
        .await
    }

    /// Fetch one page of results together with the total count. The count
    /// and the page query share one session so they observe the same state.
    async fn select_with_pagination(
        filters: Vec<Filter>,
        page: i64,
        per_page: i64,
        opts: SelectOptions,
        session: Option<Session>,
    ) -> OrmResult<PaginationResult<Self>>
    where
        Self: Sized,
    {
        if page < 1 || per_page < 1 {
            return Err(OrmError::InvalidArgument(
                "page and per_page must be positive integers".to_string(),
            ));
        }
        let count_filters = filters.clone();
        let include_inactive = opts.include_inactive;
        with_session(session, move |session| async move {
            let total =
                Self::get_count(count_filters, include_inactive, Some(session.clone())).await?;
            let page_opts = SelectOptions {
                limit: Some(per_page),
                offset: Some((page - 1) * per_page),
                ..opts
            };
            let items = Self::select_all(filters, page_opts, Some(session.clone())).await?;
            Ok(PaginationResult::new(items, total, page, per_page))
        })
        .await
    }

    /// Run a fully-formed query with an explicit result shape
    async fn execute_query(
        builder: QueryBuilder<Self>,
        mode: FetchMode,
        session: Option<Session>,
    ) -> OrmResult<Fetched>
    where
        Self: Sized,
    {
        with_session(session, move |session| async move {
            builder.fetch(&session, mode).await
        })
        .await
    }
}

impl<T: Model> QueryMethods for T {}

fn validate_options(opts: &SelectOptions) -> OrmResult<()> {
    if matches!(opts.offset, Some(offset) if offset < 0) {
        return Err(OrmError::InvalidArgument(
            "offset must not be negative".to_string(),
        ));
    }
    if matches!(opts.limit, Some(limit) if limit < 0) {
        return Err(OrmError::InvalidArgument(
            "limit must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Validate inputs and assemble the shared SELECT shape: visibility filter,
/// caller filters, ordering, and bounds. Fails fast, before any I/O.
fn assemble<M: Model>(filters: Vec<Filter>, opts: &SelectOptions) -> OrmResult<QueryBuilder<M>> {
    validate_filters::<M>(&filters)?;
    validate_options(opts)?;
    loading::validate_relations::<M>(&opts.load_with)?;
    let order_pairs = parse_order_specs(M::table_name(), M::columns(), &opts.order_by)?;

    let mut builder = <M as QueryMethods>::visible_query(opts.include_inactive)
        .filters(filters)
        .order_by_pairs(order_pairs);
    if let Some(limit) = opts.limit {
        builder = builder.limit(limit);
    }
    if let Some(offset) = opts.offset {
        builder = builder.offset(offset);
    }
    Ok(builder)
}
