//! Eager loading
//!
//! Resolves relationship names to batched secondary selects so that loading
//! related rows for N parents costs a bounded number of queries instead of
//! N round trips. Related rows are fetched as JSON documents, grouped by
//! foreign key, and attached to their parents.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{OrmError, OrmResult};
use crate::model::Model;
use crate::query::row;
use crate::session::Session;

/// Rows fetched per secondary-select statement
const MAX_BATCH_SIZE: usize = 100;

/// Relationship kinds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelationKind {
    HasMany,
    HasOne,
}

/// A declared relationship: rows of `table` whose `foreign_key` equals the
/// parent's `local_key`
#[derive(Debug, Clone)]
pub struct Relation {
    pub name: &'static str,
    pub table: &'static str,
    pub local_key: &'static str,
    pub foreign_key: &'static str,
    pub kind: RelationKind,
}

/// Check every requested name against the model's declared relationships.
/// Fails fast with an unknown-field fault before any statement is issued.
pub(crate) fn validate_relations<M: Model>(names: &[String]) -> OrmResult<()> {
    for name in names {
        find_relation::<M>(name)?;
    }
    Ok(())
}

fn find_relation<M: Model>(name: &str) -> OrmResult<&'static Relation> {
    M::relations()
        .iter()
        .find(|relation| relation.name == name)
        .ok_or_else(|| OrmError::UnknownField {
            table: M::table_name(),
            field: name.to_string(),
        })
}

/// Load the requested relationships for every model and attach the fetched
/// rows. One batched statement per `MAX_BATCH_SIZE` distinct parent keys.
pub(crate) async fn load_related<M: Model>(
    session: &Session,
    models: &mut [M],
    names: &[String],
) -> OrmResult<()> {
    if models.is_empty() {
        return Ok(());
    }
    for name in names {
        let relation = find_relation::<M>(name)?;

        let mut keys: Vec<Value> = Vec::new();
        for model in models.iter() {
            if let Some(key) = model.to_fields().get(relation.local_key) {
                if !key.is_null() && !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }

        let mut grouped: HashMap<String, Vec<Value>> = HashMap::new();
        for chunk in keys.chunks(MAX_BATCH_SIZE) {
            let placeholders: Vec<String> =
                (1..=chunk.len()).map(|i| format!("${}", i)).collect();
            let sql = format!(
                "SELECT * FROM {} WHERE {} IN ({})",
                relation.table,
                relation.foreign_key,
                placeholders.join(", ")
            );
            let rows = session.fetch_all(&sql, chunk).await?;
            for pg_row in &rows {
                let document = row::document(pg_row)?;
                let group = document
                    .get(relation.foreign_key)
                    .cloned()
                    .unwrap_or(Value::Null);
                grouped.entry(group.to_string()).or_default().push(document);
            }
        }

        for model in models.iter_mut() {
            let rows = model
                .to_fields()
                .get(relation.local_key)
                .map(|key| grouped.get(&key.to_string()).cloned().unwrap_or_default())
                .unwrap_or_default();
            model.set_loaded(relation.name, rows);
        }
    }
    Ok(())
}
