//! Facade behavior that holds without a live database: statement assembly,
//! argument validation ahead of any I/O, and document output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use ormkit::{
    CrudOperations, FieldMap, Filter, Join, Model, ModelDocument, OrmError, OrmResult,
    QueryMethods, Relation, RelationKind, SelectOptions,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TestUser {
    id: Option<i64>,
    name: String,
    email: String,
    is_deleted: bool,
    #[serde(skip)]
    related: BTreeMap<String, Vec<Value>>,
}

impl TestUser {
    fn sample() -> Self {
        Self {
            id: Some(1),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            is_deleted: false,
            related: BTreeMap::new(),
        }
    }
}

impl Model for TestUser {
    type PrimaryKey = i64;

    fn table_name() -> &'static str {
        "users"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "name", "email", "is_deleted"]
    }

    fn primary_key(&self) -> Option<i64> {
        self.id
    }

    fn set_primary_key(&mut self, key: i64) {
        self.id = Some(key);
    }

    fn soft_delete_column() -> Option<&'static str> {
        Some("is_deleted")
    }

    fn relations() -> &'static [Relation] {
        &[Relation {
            name: "posts",
            table: "posts",
            local_key: "id",
            foreign_key: "user_id",
            kind: RelationKind::HasMany,
        }]
    }

    fn from_row(row: &sqlx::postgres::PgRow) -> OrmResult<Self> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            is_deleted: row.try_get("is_deleted")?,
            related: BTreeMap::new(),
        })
    }

    fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        if let Some(id) = self.id {
            fields.insert("id".to_string(), json!(id));
        }
        fields.insert("name".to_string(), json!(self.name));
        fields.insert("email".to_string(), json!(self.email));
        fields.insert("is_deleted".to_string(), json!(self.is_deleted));
        fields
    }

    fn set_loaded(&mut self, relation: &str, rows: Vec<Value>) {
        self.related.insert(relation.to_string(), rows);
    }

    fn loaded(&self) -> Option<&BTreeMap<String, Vec<Value>>> {
        Some(&self.related)
    }
}

// A model without a soft-delete column, for the negative paths
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HardRecord {
    id: Option<i64>,
    label: String,
}

impl Model for HardRecord {
    type PrimaryKey = i64;

    fn table_name() -> &'static str {
        "hard_records"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "label"]
    }

    fn primary_key(&self) -> Option<i64> {
        self.id
    }

    fn set_primary_key(&mut self, key: i64) {
        self.id = Some(key);
    }

    fn from_row(row: &sqlx::postgres::PgRow) -> OrmResult<Self> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            label: row.try_get("label")?,
        })
    }

    fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        if let Some(id) = self.id {
            fields.insert("id".to_string(), json!(id));
        }
        fields.insert("label".to_string(), json!(self.label));
        fields
    }
}

#[test]
fn base_query_excludes_soft_deleted_rows() {
    let (sql, params) = TestUser::query().to_sql_with_params();
    assert_eq!(sql, "SELECT * FROM users WHERE is_deleted = $1");
    assert_eq!(params, vec![json!(false)]);
}

#[test]
fn base_query_without_soft_delete_has_no_implicit_filter() {
    let sql = HardRecord::query().to_sql();
    assert_eq!(sql, "SELECT * FROM hard_records");
}

#[test]
fn visible_query_can_include_inactive_rows() {
    let sql = TestUser::visible_query(true).to_sql();
    assert_eq!(sql, "SELECT * FROM users");
}

#[test]
fn build_filters_produces_equality_per_field() {
    let mut fields = FieldMap::new();
    fields.insert("name".to_string(), json!("alice"));
    fields.insert("email".to_string(), json!("a@example.com"));
    let filters = TestUser::build_filters(&fields).unwrap();
    assert_eq!(filters.len(), 2);

    let (sql, params) = TestUser::visible_query(true)
        .filters(filters)
        .to_sql_with_params();
    assert_eq!(sql, "SELECT * FROM users WHERE email = $1 AND name = $2");
    assert_eq!(params, vec![json!("a@example.com"), json!("alice")]);
}

#[test]
fn build_filters_rejects_unknown_field() {
    let mut fields = FieldMap::new();
    fields.insert("nope".to_string(), json!(1));
    let err = TestUser::build_filters(&fields).unwrap_err();
    assert!(matches!(err, OrmError::UnknownField { table: "users", .. }));
}

#[tokio::test]
async fn select_rejects_unknown_filter_column_before_io() {
    // no pool is initialized in this test binary: reaching the session
    // layer would fail with a configuration fault instead
    let err = TestUser::select_one(
        vec![Filter::eq("nope", 1)],
        SelectOptions::default(),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OrmError::UnknownField { .. }));
}

#[tokio::test]
async fn select_rejects_unknown_order_field_before_io() {
    let opts = SelectOptions {
        order_by: vec!["-nope".to_string()],
        ..Default::default()
    };
    let err = TestUser::select_all(vec![], opts, None).await.unwrap_err();
    assert!(matches!(err, OrmError::UnknownField { .. }));
}

#[tokio::test]
async fn select_rejects_unknown_loader_before_io() {
    let opts = SelectOptions {
        load_with: vec!["comments".to_string()],
        ..Default::default()
    };
    let err = TestUser::select_all(vec![], opts, None).await.unwrap_err();
    assert!(matches!(err, OrmError::UnknownField { .. }));
}

#[tokio::test]
async fn select_rejects_negative_offset_before_io() {
    let opts = SelectOptions {
        offset: Some(-1),
        ..Default::default()
    };
    let err = TestUser::select_all(vec![], opts, None).await.unwrap_err();
    assert!(matches!(err, OrmError::InvalidArgument(_)));
}

#[tokio::test]
async fn pagination_rejects_zero_page_before_io() {
    let err =
        TestUser::select_with_pagination(vec![], 0, 10, SelectOptions::default(), None)
            .await
            .unwrap_err();
    assert!(matches!(err, OrmError::InvalidArgument(_)));
}

#[tokio::test]
async fn pagination_rejects_zero_per_page_before_io() {
    let err =
        TestUser::select_with_pagination(vec![], 1, 0, SelectOptions::default(), None)
            .await
            .unwrap_err();
    assert!(matches!(err, OrmError::InvalidArgument(_)));
}

#[tokio::test]
async fn joined_select_requires_explicit_columns() {
    let err = TestUser::select_with_joins(
        vec![Join::inner("posts", "users.id", "posts.user_id")],
        &[],
        vec![],
        SelectOptions::default(),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OrmError::InvalidArgument(_)));
}

#[tokio::test]
async fn projection_rejects_unknown_column() {
    let err = TestUser::select_columns(
        &["nope"],
        vec![],
        SelectOptions::default(),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OrmError::UnknownField { .. }));
}

#[tokio::test]
async fn create_rejects_unknown_field_before_io() {
    let mut data = FieldMap::new();
    data.insert("nope".to_string(), json!("x"));
    let err = TestUser::create(data, None).await.unwrap_err();
    assert!(matches!(err, OrmError::UnknownField { .. }));
}

#[tokio::test]
async fn soft_delete_requires_flag_column() {
    let err = HardRecord::soft_delete(vec![Filter::eq("id", 1)], None)
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::InvalidArgument(_)));
}

#[tokio::test]
async fn operations_without_provider_fail_with_configuration_fault() {
    let err = TestUser::select_all(vec![], SelectOptions::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::Configuration(_)));
}

#[test]
fn document_output_expands_loaded_relations_on_request() {
    let mut user = TestUser::sample();
    user.set_loaded("posts", vec![json!({"id": 10, "user_id": 1})]);

    let bare = user.to_document(false).unwrap();
    assert!(bare.get("posts").is_none());
    assert_eq!(bare.get("name"), Some(&json!("Test User")));

    let expanded = user.to_document(true).unwrap();
    assert_eq!(
        expanded.get("posts"),
        Some(&json!([{"id": 10, "user_id": 1}]))
    );
}

#[test]
fn join_order_and_bounds_render_into_sql() {
    let (sql, params) = TestUser::visible_query(true)
        .columns(&["users.id", "posts.title"])
        .filter(Filter::eq("users.name", "alice"))
        .inner_join("posts", "users.id", "posts.user_id")
        .order_by_desc("users.id")
        .limit(10)
        .offset(20)
        .to_sql_with_params();
    assert_eq!(
        sql,
        "SELECT users.id, posts.title FROM users \
         INNER JOIN posts ON users.id = posts.user_id \
         WHERE users.name = $1 ORDER BY users.id DESC LIMIT 10 OFFSET 20"
    );
    assert_eq!(params, vec![json!("alice")]);
}
