//! Query builder for generating parameterized SQL
//!
//! Composes a fixed clause skeleton (SELECT/WHERE/GROUP BY/ORDER BY/LIMIT)
//! and carries bound values alongside it. User-supplied values go through
//! `where_bind`; clause text is only ever built from fixed fragments.

use pulse_store::Value;

/// A built SQL statement with its bound parameters, in placeholder order.
#[derive(Debug, Clone)]
pub struct BoundQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Builder for aggregate SQL over a single table
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    select: Vec<String>,
    where_clauses: Vec<String>,
    params: Vec<Value>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    limit: Option<u32>,
}

impl QueryBuilder {
    /// Create a new query builder for a table
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: Vec::new(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Add a SELECT column
    pub fn select(mut self, column: impl Into<String>) -> Self {
        self.select.push(column.into());
        self
    }

    /// Add a SELECT expression with alias
    pub fn select_as(mut self, expr: impl Into<String>, alias: impl Into<String>) -> Self {
        self.select
            .push(format!("{} AS {}", expr.into(), alias.into()));
        self
    }

    /// Add a WHERE clause with no bound value
    pub fn where_clause(mut self, clause: impl Into<String>) -> Self {
        self.where_clauses.push(clause.into());
        self
    }

    /// Add a WHERE clause containing one `?` placeholder and bind its value
    pub fn where_bind(mut self, clause: impl Into<String>, value: Value) -> Self {
        self.where_clauses.push(clause.into());
        self.params.push(value);
        self
    }

    /// Add a GROUP BY column
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    /// Add an ORDER BY column (ascending)
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by.push(column.into());
        self
    }

    /// Add an ORDER BY column, descending
    pub fn order_by_desc(mut self, column: impl Into<String>) -> Self {
        self.order_by.push(format!("{} DESC", column.into()));
        self
    }

    /// Set LIMIT
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Build the final SQL and its parameters
    pub fn build(self) -> BoundQuery {
        let mut sql = String::new();

        sql.push_str("SELECT ");
        if self.select.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.select.join(", "));
        }

        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clauses.join(" AND "));
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        BoundQuery {
            sql,
            params: self.params,
        }
    }
}
