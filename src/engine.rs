//! Row matching and field-level comparison
//!
//! Two matching modes exist, chosen once per run:
//!
//! * **Keyed**: both sides share the same non-empty primary key and every key
//!   column is compared. Both cursors are drained into ordered maps, and the
//!   union of keys is walked in ascending key order. This buffers both result
//!   sets in full, trading memory for exact key matching.
//! * **Positional**: rows are paired by ordinal while both cursors are read in
//!   lockstep; only one row per side is held at a time.

use crate::adapter::RowCursor;
use crate::error::{Result, RowdiffError};
use crate::model::{FieldDifference, RowClass, RowDifference};
use crate::value::{Row, RowKey, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::iter::Peekable;
use std::sync::Arc;

/// How rows of the two sides are paired
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchMode {
    /// Match by primary-key equality, key columns in side A's order
    Keyed(Vec<String>),
    /// Match by row ordinal
    Positional,
}

impl MatchMode {
    /// Keyed matching when both sides expose the same non-empty key set and
    /// every key column is among the compared fields; positional otherwise.
    pub fn select(primary_keys_a: &[String], primary_keys_b: &[String], fields: &[String]) -> Self {
        let keys_a: HashSet<&String> = primary_keys_a.iter().collect();
        let keys_b: HashSet<&String> = primary_keys_b.iter().collect();

        if !keys_a.is_empty()
            && keys_a == keys_b
            && primary_keys_a.iter().all(|k| fields.contains(k))
        {
            MatchMode::Keyed(primary_keys_a.to_vec())
        } else {
            MatchMode::Positional
        }
    }

    pub fn is_keyed(&self) -> bool {
        matches!(self, MatchMode::Keyed(_))
    }
}

/// Row counts and differences from one engine run
#[derive(Debug, Clone, PartialEq)]
pub struct DiffOutcome {
    pub row_count_a: u64,
    pub row_count_b: u64,
    pub differences: Vec<RowDifference>,
}

/// Compares two row streams over a fixed field list
#[derive(Debug, Clone)]
pub struct DiffEngine {
    fields: Vec<String>,
    mode: MatchMode,
}

impl DiffEngine {
    pub fn new(fields: Vec<String>, mode: MatchMode) -> Self {
        Self { fields, mode }
    }

    pub fn mode(&self) -> &MatchMode {
        &self.mode
    }

    /// Consume both cursors and collect the row differences.
    ///
    /// Any cursor error aborts the run and comes back as `ComparisonFailed`;
    /// no partial outcome is returned.
    pub fn run(&self, cursor_a: RowCursor<'_>, cursor_b: RowCursor<'_>) -> Result<DiffOutcome> {
        log::info!("Comparing {} fields using {:?} matching", self.fields.len(), self.mode);

        let outcome = match &self.mode {
            MatchMode::Keyed(keys) => self.run_keyed(keys, cursor_a, cursor_b),
            MatchMode::Positional => self.run_positional(cursor_a, cursor_b),
        }
        .map_err(RowdiffError::comparison_failed)?;

        log::info!(
            "Compared {} rows from table1 and {} rows from table2, {} row differences",
            outcome.row_count_a,
            outcome.row_count_b,
            outcome.differences.len()
        );
        Ok(outcome)
    }

    fn run_keyed(
        &self,
        keys: &[String],
        cursor_a: RowCursor<'_>,
        cursor_b: RowCursor<'_>,
    ) -> Result<DiffOutcome> {
        let key_columns: Arc<[String]> = keys.iter().cloned().collect();

        let (rows_a, row_count_a) = drain_keyed(cursor_a, &key_columns, "table1")?;
        let (rows_b, row_count_b) = drain_keyed(cursor_b, &key_columns, "table2")?;
        log::debug!(
            "Buffered {} keys from table1 and {} keys from table2",
            rows_a.len(),
            rows_b.len()
        );

        let mut differences = Vec::new();
        let mut row_number = 0u64;

        for pair in MergeByKey::new(rows_a.into_iter(), rows_b.into_iter()) {
            row_number += 1;
            let row_diff = match pair {
                Paired::Both(key, row_a, row_b) => {
                    let diffs = compare_row(&row_a, &row_b, &self.fields);
                    if diffs.is_empty() {
                        continue;
                    }
                    log::debug!("Row {} ({}) has {} differences", row_number, key, diffs.len());
                    RowDifference {
                        row_number,
                        class: RowClass::DifferentData,
                        key: Some(key),
                        differences: diffs,
                    }
                }
                Paired::OnlyA(key, row_a) => RowDifference {
                    row_number,
                    class: RowClass::OnlyInA,
                    key: Some(key),
                    differences: self.one_sided(&row_a, RowClass::OnlyInA),
                },
                Paired::OnlyB(key, row_b) => RowDifference {
                    row_number,
                    class: RowClass::OnlyInB,
                    key: Some(key),
                    differences: self.one_sided(&row_b, RowClass::OnlyInB),
                },
            };
            differences.push(row_diff);
        }

        Ok(DiffOutcome {
            row_count_a,
            row_count_b,
            differences,
        })
    }

    fn run_positional(
        &self,
        cursor_a: RowCursor<'_>,
        cursor_b: RowCursor<'_>,
    ) -> Result<DiffOutcome> {
        let mut cursor_a = cursor_a.fuse();
        let mut cursor_b = cursor_b.fuse();
        let mut differences = Vec::new();
        let mut row_count_a = 0u64;
        let mut row_count_b = 0u64;
        let mut row_number = 0u64;

        loop {
            let next_a = cursor_a.next().transpose()?;
            let next_b = cursor_b.next().transpose()?;
            if next_a.is_some() {
                row_count_a += 1;
            }
            if next_b.is_some() {
                row_count_b += 1;
            }

            let (class, diffs) = match (next_a, next_b) {
                (None, None) => break,
                (Some(row_a), Some(row_b)) => {
                    (RowClass::DifferentData, compare_row(&row_a, &row_b, &self.fields))
                }
                (Some(row_a), None) => (RowClass::OnlyInA, self.one_sided(&row_a, RowClass::OnlyInA)),
                (None, Some(row_b)) => (RowClass::OnlyInB, self.one_sided(&row_b, RowClass::OnlyInB)),
            };

            row_number += 1;
            if diffs.is_empty() {
                continue;
            }
            log::debug!("Row {} has {} differences", row_number, diffs.len());
            differences.push(RowDifference {
                row_number,
                class,
                key: None,
                differences: diffs,
            });
        }

        Ok(DiffOutcome {
            row_count_a,
            row_count_b,
            differences,
        })
    }

    /// Field entries for a row present on one side only; the absent side is
    /// reported as null.
    fn one_sided(&self, row: &Row, class: RowClass) -> Vec<FieldDifference> {
        self.fields
            .iter()
            .map(|field| {
                let value = row.value_or_null(field);
                match class {
                    RowClass::OnlyInB => FieldDifference::new(field.clone(), Value::Null, value),
                    _ => FieldDifference::new(field.clone(), value, Value::Null),
                }
            })
            .collect()
    }
}

/// Compare two rows over `fields` with [`Value::native_eq`]; null only equals
/// null and NaN equals nothing.
///
/// Returns one entry per unequal field, empty when the rows match.
pub fn compare_row(row_a: &Row, row_b: &Row, fields: &[String]) -> Vec<FieldDifference> {
    fields
        .iter()
        .filter_map(|field| {
            let value_a = row_a.value_or_null(field);
            let value_b = row_b.value_or_null(field);
            if !value_a.native_eq(&value_b) {
                Some(FieldDifference::new(field.clone(), value_a, value_b))
            } else {
                None
            }
        })
        .collect()
}

fn drain_keyed(
    cursor: RowCursor<'_>,
    key_columns: &Arc<[String]>,
    side: &str,
) -> Result<(BTreeMap<RowKey, Row>, u64)> {
    let mut rows = BTreeMap::new();
    let mut count = 0u64;

    for row in cursor {
        let row = row?;
        count += 1;
        let key = RowKey::from_row(key_columns, &row).ok_or_else(|| {
            RowdiffError::adapter(format!(
                "row {} of {} is missing key columns {:?}",
                count,
                side,
                key_columns.as_ref()
            ))
        })?;
        if rows.insert(key, row).is_some() {
            log::warn!("Duplicate primary key in {} at row {}", side, count);
        }
    }

    Ok((rows, count))
}

enum Paired {
    Both(RowKey, Row, Row),
    OnlyA(RowKey, Row),
    OnlyB(RowKey, Row),
}

/// Walks two key-ordered streams as one ascending union of keys
struct MergeByKey<A: Iterator, B: Iterator> {
    a: Peekable<A>,
    b: Peekable<B>,
}

impl<A, B> MergeByKey<A, B>
where
    A: Iterator<Item = (RowKey, Row)>,
    B: Iterator<Item = (RowKey, Row)>,
{
    fn new(a: A, b: B) -> Self {
        Self {
            a: a.peekable(),
            b: b.peekable(),
        }
    }
}

impl<A, B> Iterator for MergeByKey<A, B>
where
    A: Iterator<Item = (RowKey, Row)>,
    B: Iterator<Item = (RowKey, Row)>,
{
    type Item = Paired;

    fn next(&mut self) -> Option<Paired> {
        let ordering = match (self.a.peek(), self.b.peek()) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((key_a, _)), Some((key_b, _))) => key_a.cmp(key_b),
        };

        match ordering {
            Ordering::Less => self.a.next().map(|(k, row)| Paired::OnlyA(k, row)),
            Ordering::Greater => self.b.next().map(|(k, row)| Paired::OnlyB(k, row)),
            Ordering::Equal => {
                let (key, row_a) = self.a.next()?;
                let (_, row_b) = self.b.next()?;
                Some(Paired::Both(key, row_a, row_b))
            }
        }
    }
}
