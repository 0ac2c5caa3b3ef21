//! ORDER BY operations and order-spec parsing

use super::builder::QueryBuilder;
use super::types::OrderDirection;
use crate::error::{OrmError, OrmResult};

impl<M> QueryBuilder<M> {
    /// Order ascending by a column
    pub fn order_by(mut self, column: &str) -> Self {
        self.order_by.push((column.to_string(), OrderDirection::Asc));
        self
    }

    /// Order descending by a column
    pub fn order_by_desc(mut self, column: &str) -> Self {
        self.order_by
            .push((column.to_string(), OrderDirection::Desc));
        self
    }

    pub(crate) fn order_by_pairs(mut self, pairs: Vec<(String, OrderDirection)>) -> Self {
        self.order_by.extend(pairs);
        self
    }
}

/// Parse order specs of the form `"name"` / `"-created_at"` (leading `-`
/// means descending), validating each name against the model's declared
/// columns. An unknown name is an unknown-field fault, raised before any
/// statement is issued. Table-qualified names pass through; they reference
/// joined tables.
pub fn parse_order_specs(
    table: &'static str,
    columns: &[&str],
    specs: &[String],
) -> OrmResult<Vec<(String, OrderDirection)>> {
    let mut pairs = Vec::with_capacity(specs.len());
    for spec in specs {
        let (name, direction) = match spec.strip_prefix('-') {
            Some(rest) => (rest, OrderDirection::Desc),
            None => (spec.as_str(), OrderDirection::Asc),
        };
        if !name.contains('.') && !columns.iter().any(|c| *c == name) {
            return Err(OrmError::UnknownField {
                table,
                field: name.to_string(),
            });
        }
        pairs.push((name.to_string(), direction));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[&str] = &["id", "name", "created_at"];

    #[test]
    fn plain_name_is_ascending() {
        let pairs = parse_order_specs("users", COLUMNS, &["name".to_string()]).unwrap();
        assert_eq!(pairs, vec![("name".to_string(), OrderDirection::Asc)]);
    }

    #[test]
    fn dash_prefix_is_descending() {
        let pairs = parse_order_specs("users", COLUMNS, &["-created_at".to_string()]).unwrap();
        assert_eq!(
            pairs,
            vec![("created_at".to_string(), OrderDirection::Desc)]
        );
    }

    #[test]
    fn unknown_name_fails() {
        let err = parse_order_specs("users", COLUMNS, &["-nope".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "users has no field 'nope'");
    }
}
