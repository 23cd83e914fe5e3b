//! Database access interface consumed by the comparison engine
//!
//! The engine only ever talks to [`DatabaseAdapter`]; each backend provides
//! one implementation of it.

pub mod duckdb;
pub mod memory;

pub use self::duckdb::DuckDbAdapter;
pub use self::memory::{MemoryAdapter, MemoryTable};

use crate::error::Result;
use crate::query::{QueryPlan, Source};
use crate::value::Row;

/// Forward-only, single-pass row cursor. Each row's values line up with the
/// plan's selected columns.
pub type RowCursor<'a> = Box<dyn Iterator<Item = Result<Row>> + 'a>;

/// Backend-specific access to one data source.
///
/// All reads take `&self` so one adapter can serve both sides of a
/// comparison. Adapters never write to the source.
pub trait DatabaseAdapter {
    /// Short backend label used in log messages
    fn backend(&self) -> &str;

    /// Ordered column names of a table or query.
    ///
    /// Fails with `TableNotFound` when the source does not exist.
    fn fields(&self, source: &Source) -> Result<Vec<String>>;

    /// Ordered primary-key columns of a table; empty when there is none or
    /// when the source is a query.
    fn primary_keys(&self, source: &Source) -> Result<Vec<String>>;

    /// Run a query plan, preserving its column order, filter and ordering.
    fn execute(&self, plan: &QueryPlan) -> Result<RowCursor<'_>>;

    /// Release underlying resources. Calling it more than once is harmless.
    fn close(&mut self) -> Result<()>;
}
