//! Deterministic, read-only query construction

use serde::{Deserialize, Serialize};
use std::fmt;

/// What one side of a comparison reads from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// A table (or view) name, optionally schema-qualified
    Table(String),
    /// An ad-hoc `SELECT` statement, used as a derived table
    Query(String),
}

impl Source {
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table(name.into())
    }

    pub fn query(sql: impl Into<String>) -> Self {
        Self::Query(sql.into())
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Source::Query(_))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Table(name) => write!(f, "{}", name),
            Source::Query(sql) => write!(f, "({})", sql.trim()),
        }
    }
}

/// Adapter-agnostic description of one side's query.
///
/// Adapters render this into their own SQL dialect but must keep the column
/// order, the filter and the ordering exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    pub source: Source,
    /// Selected columns, in result order
    pub columns: Vec<String>,
    /// Selected columns that are only present for keying and ordering
    pub extra_columns: Vec<String>,
    /// Raw filter predicate. Never parsed, validated or parameterized.
    pub filter: Option<String>,
    pub order_by: Vec<String>,
}

impl QueryPlan {
    /// Selected columns that take part in field-level comparison
    pub fn compared_columns(&self) -> impl Iterator<Item = &String> {
        self.columns
            .iter()
            .filter(move |c| !self.extra_columns.contains(c))
    }
}

/// Build the query for one side.
///
/// Every primary-key column is selected even when it is not among `fields`;
/// such columns are reported in [`QueryPlan::extra_columns`]. Rows are ordered
/// by the primary key, or by every selected column when there is none, so
/// that positional matching sees a reproducible sequence.
///
/// The filter is trusted caller input and is passed through verbatim.
pub fn build(
    fields: &[String],
    source: &Source,
    filter: Option<&str>,
    primary_keys: &[String],
) -> QueryPlan {
    let mut columns = fields.to_vec();
    let mut extra_columns = Vec::new();

    for key in primary_keys {
        if !columns.contains(key) {
            columns.push(key.clone());
            extra_columns.push(key.clone());
        }
    }

    let order_by = if primary_keys.is_empty() {
        columns.clone()
    } else {
        primary_keys.to_vec()
    };

    let filter = filter
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string);

    let plan = QueryPlan {
        source: source.clone(),
        columns,
        extra_columns,
        filter,
        order_by,
    };
    log::debug!("Built query plan: {:?}", plan);
    plan
}

/// Combine a shared predicate with a side-specific one.
pub fn combine_filters(shared: Option<&str>, side: Option<&str>) -> Option<String> {
    let shared = shared.map(str::trim).filter(|s| !s.is_empty());
    let side = side.map(str::trim).filter(|s| !s.is_empty());

    match (shared, side) {
        (Some(a), Some(b)) => Some(format!("({}) AND ({})", a, b)),
        (Some(a), None) => Some(a.to_string()),
        (None, Some(b)) => Some(b.to_string()),
        (None, None) => None,
    }
}
