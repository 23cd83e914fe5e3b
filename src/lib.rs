//! # rowdiff
//!
//! Row-level comparison of two relational tables or queries. Columns are
//! reconciled between the sides, rows are matched by primary key or by
//! position, and every field-level difference is reported, optionally as a
//! CSV report.

pub mod adapter;
pub mod cli;
pub mod commands;
pub mod comparator;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod output;
pub mod progress;
pub mod query;
pub mod report;
pub mod schema;
pub mod value;

pub use adapter::{DatabaseAdapter, DuckDbAdapter, MemoryAdapter, MemoryTable};
pub use comparator::{compare, ComparisonSpec};
pub use config::{BackendConfig, ComparisonProfile};
pub use error::{Result, RowdiffError};
pub use model::{ComparisonResult, FieldDifference, RowClass, RowDifference, Summary};
pub use query::Source;
pub use value::{Row, RowKey, Value};
