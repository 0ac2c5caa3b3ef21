//! Filter expressions
//!
//! A [`Filter`] is a call-scoped predicate over one column. Variadic filters
//! passed to an operation AND together. Column names are checked against the
//! model's declared schema by the facade before any statement is issued.

use serde_json::Value;

use super::types::QueryOperator;

/// One predicate over a column
#[derive(Debug, Clone)]
pub struct Filter {
    pub(crate) column: String,
    pub(crate) operator: QueryOperator,
    pub(crate) value: Option<Value>,
    pub(crate) values: Vec<Value>,
}

impl Filter {
    fn unary(column: &str, operator: QueryOperator) -> Self {
        Self {
            column: column.to_string(),
            operator,
            value: None,
            values: Vec::new(),
        }
    }

    fn binary<T: Into<Value>>(column: &str, operator: QueryOperator, value: T) -> Self {
        Self {
            column: column.to_string(),
            operator,
            value: Some(value.into()),
            values: Vec::new(),
        }
    }

    pub fn eq<T: Into<Value>>(column: &str, value: T) -> Self {
        Self::binary(column, QueryOperator::Equal, value)
    }

    pub fn ne<T: Into<Value>>(column: &str, value: T) -> Self {
        Self::binary(column, QueryOperator::NotEqual, value)
    }

    pub fn gt<T: Into<Value>>(column: &str, value: T) -> Self {
        Self::binary(column, QueryOperator::GreaterThan, value)
    }

    pub fn gte<T: Into<Value>>(column: &str, value: T) -> Self {
        Self::binary(column, QueryOperator::GreaterThanOrEqual, value)
    }

    pub fn lt<T: Into<Value>>(column: &str, value: T) -> Self {
        Self::binary(column, QueryOperator::LessThan, value)
    }

    pub fn lte<T: Into<Value>>(column: &str, value: T) -> Self {
        Self::binary(column, QueryOperator::LessThanOrEqual, value)
    }

    pub fn like(column: &str, pattern: &str) -> Self {
        Self::binary(column, QueryOperator::Like, pattern.to_string())
    }

    pub fn not_like(column: &str, pattern: &str) -> Self {
        Self::binary(column, QueryOperator::NotLike, pattern.to_string())
    }

    pub fn is_null(column: &str) -> Self {
        Self::unary(column, QueryOperator::IsNull)
    }

    pub fn is_not_null(column: &str) -> Self {
        Self::unary(column, QueryOperator::IsNotNull)
    }

    pub fn in_list<T: Into<Value>>(column: &str, values: Vec<T>) -> Self {
        Self {
            column: column.to_string(),
            operator: QueryOperator::In,
            value: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn not_in<T: Into<Value>>(column: &str, values: Vec<T>) -> Self {
        Self {
            column: column.to_string(),
            operator: QueryOperator::NotIn,
            value: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn between<T: Into<Value>>(column: &str, start: T, end: T) -> Self {
        Self {
            column: column.to_string(),
            operator: QueryOperator::Between,
            value: None,
            values: vec![start.into(), end.into()],
        }
    }

    /// The column this filter constrains
    pub fn column(&self) -> &str {
        &self.column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_carries_operand() {
        let f = Filter::eq("name", "alice");
        assert_eq!(f.column(), "name");
        assert_eq!(f.operator, QueryOperator::Equal);
        assert_eq!(f.value, Some(Value::String("alice".to_string())));
    }

    #[test]
    fn in_list_carries_all_operands() {
        let f = Filter::in_list("id", vec![1, 2, 3]);
        assert_eq!(f.values.len(), 3);
        assert!(f.value.is_none());
    }
}
