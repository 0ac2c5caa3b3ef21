//! Row decoding
//!
//! Converts Postgres rows into `serde_json` values for projected selects,
//! eager loading, and audit snapshots. Decoding dispatches on the column's
//! declared type; unrecognized types degrade to their text form.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Number, Value};
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};
use uuid::Uuid;

use crate::error::OrmResult;

/// Decode one column position into a JSON value
pub fn value_at(row: &PgRow, index: usize) -> OrmResult<Value> {
    let type_name = row.column(index).type_info().name().to_string();
    let value = match type_name.as_str() {
        "INT2" => row
            .try_get::<Option<i16>, _>(index)?
            .map(|v| Value::Number(v.into())),
        "INT4" => row
            .try_get::<Option<i32>, _>(index)?
            .map(|v| Value::Number(v.into())),
        "INT8" => row
            .try_get::<Option<i64>, _>(index)?
            .map(|v| Value::Number(v.into())),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(index)?
            .and_then(|v| Number::from_f64(v as f64))
            .map(Value::Number),
        "FLOAT8" => row
            .try_get::<Option<f64>, _>(index)?
            .and_then(Number::from_f64)
            .map(Value::Number),
        "BOOL" => row.try_get::<Option<bool>, _>(index)?.map(Value::Bool),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
            row.try_get::<Option<String>, _>(index)?.map(Value::String)
        }
        "UUID" => row
            .try_get::<Option<Uuid>, _>(index)?
            .map(|v| Value::String(v.to_string())),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(index)?
            .map(|v| Value::String(v.to_rfc3339())),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)?
            .map(|v| Value::String(v.to_string())),
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)?
            .map(|v| Value::String(v.to_string())),
        "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(index)?,
        _ => row.try_get::<Option<String>, _>(index).ok().flatten().map(Value::String),
    };
    Ok(value.unwrap_or(Value::Null))
}

/// Decode a row into a tuple of values, in column order
pub fn values(row: &PgRow) -> OrmResult<Vec<Value>> {
    (0..row.len()).map(|i| value_at(row, i)).collect()
}

/// Decode a row into a JSON object keyed by column name
pub fn document(row: &PgRow) -> OrmResult<Value> {
    let mut object = Map::new();
    for i in 0..row.len() {
        object.insert(row.column(i).name().to_string(), value_at(row, i)?);
    }
    Ok(Value::Object(object))
}
