//! Core types and enums for query building

use serde_json::Value;
use std::fmt;

/// Comparison operators available in filter expressions
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Between,
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOperator::Equal => write!(f, "="),
            QueryOperator::NotEqual => write!(f, "!="),
            QueryOperator::GreaterThan => write!(f, ">"),
            QueryOperator::GreaterThanOrEqual => write!(f, ">="),
            QueryOperator::LessThan => write!(f, "<"),
            QueryOperator::LessThanOrEqual => write!(f, "<="),
            QueryOperator::Like => write!(f, "LIKE"),
            QueryOperator::NotLike => write!(f, "NOT LIKE"),
            QueryOperator::In => write!(f, "IN"),
            QueryOperator::NotIn => write!(f, "NOT IN"),
            QueryOperator::IsNull => write!(f, "IS NULL"),
            QueryOperator::IsNotNull => write!(f, "IS NOT NULL"),
            QueryOperator::Between => write!(f, "BETWEEN"),
        }
    }
}

/// Join types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER JOIN"),
            JoinType::Left => write!(f, "LEFT JOIN"),
            JoinType::Right => write!(f, "RIGHT JOIN"),
        }
    }
}

/// One joined table paired with its join predicate
#[derive(Debug, Clone)]
pub struct Join {
    pub join_type: JoinType,
    pub table: String,
    /// (left column, right column) equated in the ON clause
    pub on: (String, String),
}

impl Join {
    pub fn inner(table: &str, left_col: &str, right_col: &str) -> Self {
        Self {
            join_type: JoinType::Inner,
            table: table.to_string(),
            on: (left_col.to_string(), right_col.to_string()),
        }
    }

    pub fn left(table: &str, left_col: &str, right_col: &str) -> Self {
        Self {
            join_type: JoinType::Left,
            table: table.to_string(),
            on: (left_col.to_string(), right_col.to_string()),
        }
    }
}

/// Ordering direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Statement kinds supported by the builder
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
}

/// Right-hand side of a SET clause or VALUES slot
#[derive(Debug, Clone)]
pub enum SetValue {
    /// Bound as a statement parameter
    Bound(Value),
    /// Rendered as literal NULL
    Null,
    /// Rendered verbatim, e.g. `now()`
    Raw(&'static str),
}

/// Column assignment for INSERT and UPDATE statements
#[derive(Debug, Clone)]
pub struct SetClause {
    pub column: String,
    pub value: SetValue,
}
