//! SELECT projection operations

use super::builder::QueryBuilder;

impl<M> QueryBuilder<M> {
    /// Add SELECT fields; a comma-separated list is split into columns
    pub fn select(mut self, fields: &str) -> Self {
        if fields == "*" {
            self.select_fields.push("*".to_string());
        } else {
            self.select_fields
                .extend(fields.split(',').map(|f| f.trim().to_string()));
        }
        self
    }

    /// Project an explicit column list
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.select_fields
            .extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// SELECT DISTINCT
    pub fn select_distinct(mut self, fields: &str) -> Self {
        self.distinct = true;
        self.select(fields)
    }

    /// Add a COUNT aggregate
    pub fn select_count(mut self, column: &str) -> Self {
        self.select_fields.push(format!("COUNT({})", column));
        self
    }
}
