//! Document output
//!
//! Serializes a model to a JSON document, optionally merging in the
//! relationship rows attached by the eager loader.

use serde_json::Value;

use crate::error::OrmResult;
use crate::loading::RelationKind;

use super::core_trait::Model;

/// Trait providing document and JSON output for models
pub trait ModelDocument: Model {
    /// Serialize to a JSON object. With `include_related`, loaded
    /// relationship rows are expanded under their relation names: has-many
    /// relations as arrays, has-one relations as a single object.
    fn to_document(&self, include_related: bool) -> OrmResult<Value> {
        let mut document = serde_json::to_value(self)?;
        if include_related {
            if let (Value::Object(object), Some(loaded)) = (&mut document, self.loaded()) {
                for (name, rows) in loaded {
                    let kind = Self::relations()
                        .iter()
                        .find(|relation| relation.name == name.as_str())
                        .map(|relation| relation.kind);
                    let value = match kind {
                        Some(RelationKind::HasOne) => {
                            rows.first().cloned().unwrap_or(Value::Null)
                        }
                        _ => Value::Array(rows.clone()),
                    };
                    object.insert(name.clone(), value);
                }
            }
        }
        Ok(document)
    }

    /// Serialize to a JSON string
    fn to_json_string(&self, include_related: bool) -> OrmResult<String> {
        let document = self.to_document(include_related)?;
        Ok(serde_json::to_string(&document)?)
    }

    /// Build an instance from a JSON document
    fn from_document(document: Value) -> OrmResult<Self>
    where
        Self: Sized,
    {
        Ok(serde_json::from_value(document)?)
    }
}

impl<T: Model> ModelDocument for T {}
