//! In-process adapter over tables held in memory

use super::{DatabaseAdapter, RowCursor};
use crate::error::{Result, RowdiffError};
use crate::query::{QueryPlan, Source};
use crate::value::{Row, Value};
use indexmap::IndexMap;
use std::sync::Arc;

/// A table held by [`MemoryAdapter`]
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    pub columns: Vec<String>,
    pub primary_keys: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl MemoryTable {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_keys = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_row(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Adapter over in-memory tables.
///
/// Supports table sources without filters. Rows are returned in the plan's
/// `ORDER BY` order.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    tables: IndexMap<String, MemoryTable>,
    fail_after: Option<usize>,
    closed: bool,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, table: MemoryTable) -> Self {
        self.tables.insert(name.into(), table);
        self
    }

    /// Make every cursor fail after yielding `rows` rows, simulating a
    /// backend error mid-stream.
    pub fn failing_after(mut self, rows: usize) -> Self {
        self.fail_after = Some(rows);
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn table(&self, source: &Source) -> Result<&MemoryTable> {
        match source {
            Source::Table(name) => self
                .tables
                .get(name)
                .ok_or_else(|| RowdiffError::table_not_found(name.clone())),
            Source::Query(_) => Err(RowdiffError::adapter(
                "memory adapter does not support query sources",
            )),
        }
    }
}

impl DatabaseAdapter for MemoryAdapter {
    fn backend(&self) -> &str {
        "memory"
    }

    fn fields(&self, source: &Source) -> Result<Vec<String>> {
        Ok(self.table(source)?.columns.clone())
    }

    fn primary_keys(&self, source: &Source) -> Result<Vec<String>> {
        match source {
            Source::Query(_) => Ok(Vec::new()),
            Source::Table(_) => Ok(self.table(source)?.primary_keys.clone()),
        }
    }

    fn execute(&self, plan: &QueryPlan) -> Result<RowCursor<'_>> {
        if plan.filter.is_some() {
            return Err(RowdiffError::adapter(
                "memory adapter does not evaluate filters",
            ));
        }

        let table = self.table(&plan.source)?;
        let indices = plan
            .columns
            .iter()
            .map(|c| {
                table.column_index(c).ok_or_else(|| {
                    RowdiffError::adapter(format!("column '{}' not found in {}", c, plan.source))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let order = plan
            .order_by
            .iter()
            .filter_map(|c| table.column_index(c))
            .collect::<Vec<_>>();

        let mut rows: Vec<&Vec<Value>> = table.rows.iter().collect();
        rows.sort_by(|a, b| {
            order
                .iter()
                .map(|&i| a[i].cmp(&b[i]))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let columns: Arc<[String]> = plan.columns.iter().cloned().collect();
        let fail_after = self.fail_after;
        let cursor = rows.into_iter().enumerate().map(move |(n, values)| {
            if fail_after.is_some_and(|limit| n >= limit) {
                return Err(RowdiffError::adapter("connection lost while reading rows"));
            }
            let selected = indices.iter().map(|&i| values[i].clone()).collect();
            Ok(Row::new(Arc::clone(&columns), selected))
        });

        Ok(Box::new(cursor))
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
