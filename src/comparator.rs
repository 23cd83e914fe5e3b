//! Top-level comparison entry point

use crate::adapter::DatabaseAdapter;
use crate::engine::{DiffEngine, MatchMode};
use crate::error::{Result, RowdiffError};
use crate::model::ComparisonResult;
use crate::query::{self, Source};
use crate::schema::{self, Resolution};

/// Caller-supplied description of one comparison run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonSpec {
    pub source_a: Source,
    pub source_b: Source,
    /// Explicit field list; empty means "derive from both sides"
    pub fields: Vec<String>,
    pub exclude: Vec<String>,
    /// Predicate applied to both sides
    pub filter: Option<String>,
    pub filter_a: Option<String>,
    pub filter_b: Option<String>,
}

impl ComparisonSpec {
    pub fn new(source_a: Source, source_b: Source) -> Self {
        Self {
            source_a,
            source_b,
            fields: Vec::new(),
            exclude: Vec::new(),
            filter: None,
            filter_a: None,
            filter_b: None,
        }
    }

    /// Compare two tables by name
    pub fn tables(table_a: impl Into<String>, table_b: impl Into<String>) -> Self {
        Self::new(Source::table(table_a), Source::table(table_b))
    }

    pub fn with_fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.fields = fields.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    pub fn with_exclude<S: AsRef<str>>(mut self, exclude: &[S]) -> Self {
        self.exclude = exclude.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_side_filters(mut self, filter_a: Option<String>, filter_b: Option<String>) -> Self {
        self.filter_a = filter_a;
        self.filter_b = filter_b;
        self
    }

    /// The same comparison with sides A and B exchanged
    pub fn swapped(&self) -> Self {
        Self {
            source_a: self.source_b.clone(),
            source_b: self.source_a.clone(),
            fields: self.fields.clone(),
            exclude: self.exclude.clone(),
            filter: self.filter.clone(),
            filter_a: self.filter_b.clone(),
            filter_b: self.filter_a.clone(),
        }
    }
}

/// Compare side A against side B.
///
/// `adapter_a` serves `spec.source_a` and `adapter_b` serves `spec.source_b`;
/// they may be the same adapter. Differing field sets without an explicit
/// field or exclude list produce a schema-mismatch result rather than an
/// error.
///
/// Filters in `spec` are raw SQL handed to the backend unchanged. Never build
/// them from untrusted input.
pub fn compare(
    spec: &ComparisonSpec,
    adapter_a: &dyn DatabaseAdapter,
    adapter_b: &dyn DatabaseAdapter,
) -> Result<ComparisonResult> {
    log::info!(
        "Comparing {} ({}) with {} ({})",
        spec.source_a,
        adapter_a.backend(),
        spec.source_b,
        adapter_b.backend()
    );

    let fields_a = adapter_a.fields(&spec.source_a)?;
    let fields_b = adapter_b.fields(&spec.source_b)?;
    let primary_keys_a = adapter_a.primary_keys(&spec.source_a)?;
    let primary_keys_b = adapter_b.primary_keys(&spec.source_b)?;
    log::debug!(
        "Primary keys: table1 {:?}, table2 {:?}",
        primary_keys_a,
        primary_keys_b
    );

    let fields = match schema::resolve(
        &fields_a,
        &fields_b,
        &spec.fields,
        &spec.exclude,
        &primary_keys_a,
    )? {
        Resolution::Fields(fields) => fields,
        Resolution::Mismatch(mismatch) => return Ok(ComparisonResult::schema_mismatch(mismatch)),
    };
    log::info!("Comparing {} fields: {}", fields.len(), fields.join(", "));

    let mode = MatchMode::select(&primary_keys_a, &primary_keys_b, &fields);
    match &mode {
        MatchMode::Keyed(keys) => log::info!("Matching rows by key ({})", keys.join(", ")),
        MatchMode::Positional => log::info!("No common primary key, matching rows by position"),
    }

    let plan_a = query::build(
        &fields,
        &spec.source_a,
        query::combine_filters(spec.filter.as_deref(), spec.filter_a.as_deref()).as_deref(),
        &primary_keys_a,
    );
    let plan_b = query::build(
        &fields,
        &spec.source_b,
        query::combine_filters(spec.filter.as_deref(), spec.filter_b.as_deref()).as_deref(),
        &primary_keys_b,
    );

    let cursor_a = adapter_a
        .execute(&plan_a)
        .map_err(RowdiffError::comparison_failed)?;
    let cursor_b = adapter_b
        .execute(&plan_b)
        .map_err(RowdiffError::comparison_failed)?;

    let outcome = DiffEngine::new(fields.clone(), mode).run(cursor_a, cursor_b)?;
    log::info!(
        "Rows: table1 {}, table2 {}, {} row differences",
        outcome.row_count_a,
        outcome.row_count_b,
        outcome.differences.len()
    );

    Ok(ComparisonResult::from_rows(
        fields,
        fields_a,
        fields_b,
        outcome.row_count_a,
        outcome.row_count_b,
        outcome.differences,
    ))
}
