//! Pagination result envelope

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::OrmResult;
use crate::model::{Model, ModelDocument};

/// One page of results together with the total count across all pages
#[derive(Debug, Clone, Serialize)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    /// Rows matching the filter, ignoring offset/limit
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T> PaginationResult<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, per_page: i64) -> Self {
        Self {
            items,
            total,
            page,
            per_page,
        }
    }

    /// Total page count; 0 only when there are no matching rows. Integer
    /// division truncates toward zero, so the empty case needs its own arm:
    /// `(0 - 1) / per_page + 1` would yield 1.
    pub fn pages(&self) -> i64 {
        if self.total <= 0 {
            0
        } else {
            (self.total - 1) / self.per_page + 1
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

impl<T: Model> PaginationResult<T> {
    /// Serialize the full envelope, items as documents, computed fields
    /// included
    pub fn to_document(&self, include_related: bool) -> OrmResult<Value> {
        let items = self
            .items
            .iter()
            .map(|item| item.to_document(include_related))
            .collect::<OrmResult<Vec<_>>>()?;
        Ok(json!({
            "items": items,
            "total": self.total,
            "page": self.page,
            "per_page": self.per_page,
            "pages": self.pages(),
            "has_next": self.has_next(),
            "has_prev": self.has_prev(),
        }))
    }
}
