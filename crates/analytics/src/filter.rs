//! Query filters
//!
//! Optional dimensions applied as equality predicates; an absent filter
//! imposes no constraint.

use serde::Deserialize;

use pulse_store::Value;

use crate::builder::QueryBuilder;

/// Optional dimension filters shared by both aggregate queries.
///
/// Deserializes directly from query-string parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct QueryFilter {
    pub server_id: Option<i32>,
    pub room_type: Option<i32>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server_id(mut self, server_id: i32) -> Self {
        self.server_id = Some(server_id);
        self
    }

    pub fn with_room_type(mut self, room_type: i32) -> Self {
        self.room_type = Some(room_type);
        self
    }

    /// Apply the present filters to a query builder as bound predicates.
    pub(crate) fn apply(&self, mut qb: QueryBuilder) -> QueryBuilder {
        if let Some(server_id) = self.server_id {
            qb = qb.where_bind("server_id = ?", Value::Int(server_id));
        }
        if let Some(room_type) = self.room_type {
            qb = qb.where_bind("room_type = ?", Value::Int(room_type));
        }
        qb
    }

    /// Append the present filters to a raw WHERE fragment.
    ///
    /// Used by queries whose skeleton (CTEs) is outside what the builder
    /// composes; values are still bound, never interpolated.
    pub(crate) fn push_predicates(&self, sql: &mut String, params: &mut Vec<Value>) {
        if let Some(server_id) = self.server_id {
            sql.push_str(" AND server_id = ?");
            params.push(Value::Int(server_id));
        }
        if let Some(room_type) = self.room_type {
            sql.push_str(" AND room_type = ?");
            params.push(Value::Int(room_type));
        }
    }
}
