//! Pulse - Analytics
//!
//! Aggregate queries over the heartbeats store.
//!
//! # Overview
//!
//! This crate builds and executes the two analytical queries:
//!
//! - **Online counts**: approximate distinct users per room over the
//!   trailing minute.
//! - **Minute retention**: per-room user cohorts tracked from one minute
//!   into the next.
//!
//! Both use `APPROX_COUNT_DISTINCT` - cardinalities are estimates with
//! bounded error, exact only on small data sets. Every user-supplied
//! filter value is bound as a query parameter; only the fixed SQL
//! skeleton varies with which filters are present.
//!
//! # Usage
//!
//! ```ignore
//! use pulse_analytics::{AnalyticsEngine, QueryFilter};
//!
//! let engine = AnalyticsEngine::new(store);
//! let filter = QueryFilter::new().with_server_id(3);
//! let onlines = engine.onlines(&filter)?;
//! let retention = engine.retention(&filter)?;
//! ```

pub mod builder;
pub mod engine;
pub mod filter;
pub mod onlines;
pub mod result;
pub mod retention;

#[cfg(test)]
mod builder_test;
#[cfg(test)]
mod onlines_test;

pub use builder::{BoundQuery, QueryBuilder};
pub use engine::AnalyticsEngine;
pub use filter::QueryFilter;
pub use onlines::OnlineCountsQuery;
pub use result::{OnlineRow, RetentionRow};
pub use retention::MinuteRetentionQuery;

/// Hard cap on aggregate query result sets
pub const MAX_RESULT_ROWS: u32 = 500;
