//! JOIN operations

use super::builder::QueryBuilder;
use super::types::{Join, JoinType};

impl<M> QueryBuilder<M> {
    /// Append a join clause; joins apply in the order they are added
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// INNER JOIN shorthand
    pub fn inner_join(self, table: &str, left_col: &str, right_col: &str) -> Self {
        self.join(Join::inner(table, left_col, right_col))
    }

    /// LEFT JOIN shorthand
    pub fn left_join(self, table: &str, left_col: &str, right_col: &str) -> Self {
        self.join(Join {
            join_type: JoinType::Left,
            table: table.to_string(),
            on: (left_col.to_string(), right_col.to_string()),
        })
    }
}
