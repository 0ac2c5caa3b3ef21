//! LIMIT/OFFSET operations

use super::builder::QueryBuilder;

impl<M> QueryBuilder<M> {
    pub fn limit(mut self, count: i64) -> Self {
        self.limit_count = Some(count);
        self
    }

    pub fn offset(mut self, count: i64) -> Self {
        self.offset_value = Some(count);
        self
    }

    /// LIMIT + OFFSET for a 1-based page
    pub fn paginate(mut self, per_page: i64, page: i64) -> Self {
        self.limit_count = Some(per_page);
        self.offset_value = Some((page - 1) * per_page);
        self
    }
}
