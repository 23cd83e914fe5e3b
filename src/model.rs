//! Difference model produced by a comparison run

use crate::schema::SchemaMismatch;
use crate::value::{RowKey, Value};
use serde::Serialize;
use std::fmt;

/// Classification of one row-level difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RowClass {
    /// Both sides have the row but at least one field differs
    #[serde(rename = "different_data")]
    DifferentData,
    /// The row exists on side A only
    #[serde(rename = "only_in_table1")]
    OnlyInA,
    /// The row exists on side B only
    #[serde(rename = "only_in_table2")]
    OnlyInB,
}

impl RowClass {
    /// Label used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            RowClass::DifferentData => "different_data",
            RowClass::OnlyInA => "only_in_table1",
            RowClass::OnlyInB => "only_in_table2",
        }
    }

    /// The classification seen from the other side
    pub fn mirrored(&self) -> Self {
        match self {
            RowClass::DifferentData => RowClass::DifferentData,
            RowClass::OnlyInA => RowClass::OnlyInB,
            RowClass::OnlyInB => RowClass::OnlyInA,
        }
    }
}

impl fmt::Display for RowClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unequal field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDifference {
    pub field: String,
    #[serde(rename = "table1_value")]
    pub value_a: Value,
    #[serde(rename = "table2_value")]
    pub value_b: Value,
}

impl FieldDifference {
    pub fn new(field: impl Into<String>, value_a: Value, value_b: Value) -> Self {
        Self {
            field: field.into(),
            value_a,
            value_b,
        }
    }
}

/// One logical row that differs between the sides
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDifference {
    /// 1-based ordinal in output order
    pub row_number: u64,
    #[serde(rename = "type")]
    pub class: RowClass,
    /// Present only when rows were matched by primary key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<RowKey>,
    pub differences: Vec<FieldDifference>,
}

impl RowDifference {
    /// `field=value, ...` for keyed rows, empty otherwise
    pub fn key_info(&self) -> String {
        self.key.as_ref().map(|k| k.to_string()).unwrap_or_default()
    }
}

/// Derived summary entries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Summary {
    /// Full field sets differ; no rows were compared
    FieldMismatch {
        only_in_a: Vec<String>,
        only_in_b: Vec<String>,
        common: Vec<String>,
    },
    #[serde(rename = "row_count")]
    RowCountMismatch {
        row_count_a: u64,
        row_count_b: u64,
    },
    MultipleRowDiff { count: usize },
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Summary::FieldMismatch {
                only_in_a,
                only_in_b,
                ..
            } => write!(
                f,
                "Field sets differ (only in table1: [{}], only in table2: [{}])",
                only_in_a.join(", "),
                only_in_b.join(", ")
            ),
            Summary::RowCountMismatch {
                row_count_a,
                row_count_b,
            } => write!(
                f,
                "Row counts differ: table1 has {} rows, table2 has {} rows",
                row_count_a, row_count_b
            ),
            Summary::MultipleRowDiff { count } => {
                write!(f, "{} rows have data differences", count)
            }
        }
    }
}

/// Complete result of one comparison run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub fields: Vec<String>,
    #[serde(rename = "table1_row_count")]
    pub row_count_a: u64,
    #[serde(rename = "table2_row_count")]
    pub row_count_b: u64,
    #[serde(rename = "differences")]
    pub summaries: Vec<Summary>,
    pub row_differences: Vec<RowDifference>,
    #[serde(rename = "table1_fields")]
    pub fields_a: Vec<String>,
    #[serde(rename = "table2_fields")]
    pub fields_b: Vec<String>,
}

impl ComparisonResult {
    /// Assemble a result from compared rows, deriving the summary entries.
    pub fn from_rows(
        fields: Vec<String>,
        fields_a: Vec<String>,
        fields_b: Vec<String>,
        row_count_a: u64,
        row_count_b: u64,
        row_differences: Vec<RowDifference>,
    ) -> Self {
        let mut summaries = Vec::new();

        if row_count_a != row_count_b {
            summaries.push(Summary::RowCountMismatch {
                row_count_a,
                row_count_b,
            });
        }

        let diff_count = row_differences
            .iter()
            .filter(|r| !r.differences.is_empty())
            .count();
        if diff_count > 0 {
            summaries.push(Summary::MultipleRowDiff { count: diff_count });
        }

        Self {
            fields,
            row_count_a,
            row_count_b,
            summaries,
            row_differences,
            fields_a,
            fields_b,
        }
    }

    /// Short-circuit result for differing field sets: zero row counts and no
    /// row differences.
    pub fn schema_mismatch(mismatch: SchemaMismatch) -> Self {
        let SchemaMismatch {
            fields_a,
            fields_b,
            only_in_a,
            only_in_b,
            common,
        } = mismatch;

        Self {
            fields: Vec::new(),
            row_count_a: 0,
            row_count_b: 0,
            summaries: vec![Summary::FieldMismatch {
                only_in_a,
                only_in_b,
                common,
            }],
            row_differences: Vec::new(),
            fields_a,
            fields_b,
        }
    }

    pub fn is_schema_mismatch(&self) -> bool {
        self.summaries
            .iter()
            .any(|s| matches!(s, Summary::FieldMismatch { .. }))
    }

    pub fn has_differences(&self) -> bool {
        !self.summaries.is_empty()
    }

    /// Number of rows with at least one field difference
    pub fn diff_count(&self) -> usize {
        self.summaries
            .iter()
            .find_map(|s| match s {
                Summary::MultipleRowDiff { count } => Some(*count),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn count_by_class(&self, class: RowClass) -> usize {
        self.row_differences
            .iter()
            .filter(|r| r.class == class)
            .count()
    }

    /// Total number of field-level differences (one report line each)
    pub fn field_difference_count(&self) -> usize {
        self.row_differences.iter().map(|r| r.differences.len()).sum()
    }
}
