//! SQL generation
//!
//! Renders a builder into one statement string with `$n` placeholders and
//! the parameter values to bind, in placeholder order.

use serde_json::Value;

use super::builder::QueryBuilder;
use super::filter::Filter;
use super::types::{QueryOperator, QueryType, SetValue};

impl<M> QueryBuilder<M> {
    /// Render the statement and its bind parameters
    pub fn to_sql_with_params(&self) -> (String, Vec<Value>) {
        match self.query_type {
            QueryType::Select => self.build_select(),
            QueryType::Insert => self.build_insert(),
            QueryType::Update => self.build_update(),
            QueryType::Delete => self.build_delete(),
        }
    }

    /// Render just the statement text
    pub fn to_sql(&self) -> String {
        self.to_sql_with_params().0
    }

    fn build_select(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();

        if self.distinct {
            sql.push_str("SELECT DISTINCT ");
        } else {
            sql.push_str("SELECT ");
        }
        if self.select_fields.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.select_fields.join(", "));
        }

        if let Some(table) = &self.table {
            sql.push_str(" FROM ");
            sql.push_str(table);
        }

        for join in &self.joins {
            sql.push_str(&format!(
                " {} {} ON {} = {}",
                join.join_type, join.table, join.on.0, join.on.1
            ));
        }

        self.push_where(&mut sql, &mut params);

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            let clauses: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("{} {}", column, direction))
                .collect();
            sql.push_str(&clauses.join(", "));
        }

        if let Some(limit) = self.limit_count {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset_value {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        (sql, params)
    }

    fn build_insert(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();

        let Some(table) = &self.table else {
            return (sql, params);
        };

        sql.push_str(&format!("INSERT INTO {}", table));
        if self.set_clauses.is_empty() {
            sql.push_str(" DEFAULT VALUES");
        } else {
            let columns: Vec<&str> = self
                .set_clauses
                .iter()
                .map(|clause| clause.column.as_str())
                .collect();
            sql.push_str(&format!(" ({}) VALUES (", columns.join(", ")));
            for (i, clause) in self.set_clauses.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                push_set_value(&mut sql, &mut params, &clause.value);
            }
            sql.push(')');
        }

        self.push_returning(&mut sql);
        (sql, params)
    }

    fn build_update(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();

        let Some(table) = &self.table else {
            return (sql, params);
        };

        sql.push_str(&format!("UPDATE {} SET ", table));
        for (i, clause) in self.set_clauses.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&format!("{} = ", clause.column));
            push_set_value(&mut sql, &mut params, &clause.value);
        }

        self.push_where(&mut sql, &mut params);
        self.push_returning(&mut sql);
        (sql, params)
    }

    fn build_delete(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();

        let Some(table) = &self.table else {
            return (sql, params);
        };

        sql.push_str(&format!("DELETE FROM {}", table));
        self.push_where(&mut sql, &mut params);
        self.push_returning(&mut sql);
        (sql, params)
    }

    fn push_where(&self, sql: &mut String, params: &mut Vec<Value>) {
        if self.filters.is_empty() {
            return;
        }
        sql.push_str(" WHERE ");
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }
            push_filter(sql, params, filter);
        }
    }

    fn push_returning(&self, sql: &mut String) {
        if let Some(returning) = &self.returning {
            sql.push_str(&format!(" RETURNING {}", returning));
        }
    }
}

fn push_set_value(sql: &mut String, params: &mut Vec<Value>, value: &SetValue) {
    match value {
        SetValue::Bound(v) => {
            params.push(v.clone());
            sql.push_str(&format!("${}", params.len()));
        }
        SetValue::Null => sql.push_str("NULL"),
        SetValue::Raw(expr) => sql.push_str(expr),
    }
}

fn push_filter(sql: &mut String, params: &mut Vec<Value>, filter: &Filter) {
    sql.push_str(&filter.column);
    match filter.operator {
        QueryOperator::IsNull | QueryOperator::IsNotNull => {
            sql.push_str(&format!(" {}", filter.operator));
        }
        QueryOperator::In | QueryOperator::NotIn => {
            sql.push_str(&format!(" {} (", filter.operator));
            for (i, value) in filter.values.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                params.push(value.clone());
                sql.push_str(&format!("${}", params.len()));
            }
            sql.push(')');
        }
        QueryOperator::Between => {
            params.push(filter.values.first().cloned().unwrap_or(Value::Null));
            let start = params.len();
            params.push(filter.values.get(1).cloned().unwrap_or(Value::Null));
            sql.push_str(&format!(" BETWEEN ${} AND ${}", start, params.len()));
        }
        _ => {
            params.push(filter.value.clone().unwrap_or(Value::Null));
            sql.push_str(&format!(" {} ${}", filter.operator, params.len()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn select_with_filters_and_order() {
        let (sql, params) = QueryBuilder::<()>::new()
            .select("*")
            .from("users")
            .filter(Filter::eq("name", "alice"))
            .filter(Filter::gt("age", 30))
            .order_by_desc("created_at")
            .limit(10)
            .offset(5)
            .to_sql_with_params();
        assert_eq!(
            sql,
            "SELECT * FROM users WHERE name = $1 AND age > $2 \
             ORDER BY created_at DESC LIMIT 10 OFFSET 5"
        );
        assert_eq!(params, vec![json!("alice"), json!(30)]);
    }

    #[test]
    fn select_defaults_to_star() {
        let sql = QueryBuilder::<()>::new().from("users").to_sql();
        assert_eq!(sql, "SELECT * FROM users");
    }

    #[test]
    fn in_list_numbers_each_placeholder() {
        let (sql, params) = QueryBuilder::<()>::new()
            .from("users")
            .filter(Filter::in_list("id", vec![1, 2, 3]))
            .to_sql_with_params();
        assert_eq!(sql, "SELECT * FROM users WHERE id IN ($1, $2, $3)");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn between_uses_two_placeholders() {
        let (sql, params) = QueryBuilder::<()>::new()
            .from("events")
            .filter(Filter::between("at", 10, 20))
            .to_sql_with_params();
        assert_eq!(sql, "SELECT * FROM events WHERE at BETWEEN $1 AND $2");
        assert_eq!(params, vec![json!(10), json!(20)]);
    }

    #[test]
    fn null_checks_bind_nothing() {
        let (sql, params) = QueryBuilder::<()>::new()
            .from("users")
            .filter(Filter::is_null("deleted_reason"))
            .filter(Filter::is_not_null("email"))
            .to_sql_with_params();
        assert_eq!(
            sql,
            "SELECT * FROM users WHERE deleted_reason IS NULL AND email IS NOT NULL"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn joins_render_in_order() {
        let sql = QueryBuilder::<()>::new()
            .columns(&["users.id", "posts.title"])
            .from("users")
            .inner_join("posts", "users.id", "posts.user_id")
            .left_join("comments", "posts.id", "comments.post_id")
            .to_sql();
        assert_eq!(
            sql,
            "SELECT users.id, posts.title FROM users \
             INNER JOIN posts ON users.id = posts.user_id \
             LEFT JOIN comments ON posts.id = comments.post_id"
        );
    }

    #[test]
    fn insert_renders_columns_placeholders_and_raw() {
        let (sql, params) = QueryBuilder::<()>::new()
            .insert_into("users")
            .set("name", "alice")
            .set("age", 30)
            .set_raw("created_at", "now()")
            .returning("*")
            .to_sql_with_params();
        assert_eq!(
            sql,
            "INSERT INTO users (name, age, created_at) VALUES ($1, $2, now()) RETURNING *"
        );
        assert_eq!(params, vec![json!("alice"), json!(30)]);
    }

    #[test]
    fn insert_without_fields_uses_default_values() {
        let sql = QueryBuilder::<()>::new().insert_into("users").to_sql();
        assert_eq!(sql, "INSERT INTO users DEFAULT VALUES");
    }

    #[test]
    fn update_numbers_set_then_where() {
        let (sql, params) = QueryBuilder::<()>::new()
            .update("users")
            .set("name", "bob")
            .set_null("nickname")
            .filter(Filter::eq("id", 7))
            .returning("id")
            .to_sql_with_params();
        assert_eq!(
            sql,
            "UPDATE users SET name = $1, nickname = NULL WHERE id = $2 RETURNING id"
        );
        assert_eq!(params, vec![json!("bob"), json!(7)]);
    }

    #[test]
    fn delete_with_returning() {
        let (sql, params) = QueryBuilder::<()>::new()
            .delete_from("users")
            .filter(Filter::eq("id", 1))
            .returning("*")
            .to_sql_with_params();
        assert_eq!(sql, "DELETE FROM users WHERE id = $1 RETURNING *");
        assert_eq!(params, vec![json!(1)]);
    }
}
