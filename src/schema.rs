//! Column reconciliation between the two sides of a comparison

use crate::error::{Result, RowdiffError};
use serde::Serialize;
use std::collections::HashSet;

/// Outcome of field resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Final ordered field list used to query and compare both sides
    Fields(Vec<String>),
    /// Full field sets differ and the caller gave no explicit or exclude list
    Mismatch(SchemaMismatch),
}

/// Field-set disagreement between the two sides.
///
/// Returned as data so the caller can inspect the available columns and retry
/// with an explicit field list or an exclude list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaMismatch {
    pub fields_a: Vec<String>,
    pub fields_b: Vec<String>,
    pub only_in_a: Vec<String>,
    pub only_in_b: Vec<String>,
    pub common: Vec<String>,
}

impl SchemaMismatch {
    pub fn between(fields_a: &[String], fields_b: &[String]) -> Self {
        let set_a: HashSet<&String> = fields_a.iter().collect();
        let set_b: HashSet<&String> = fields_b.iter().collect();

        Self {
            fields_a: fields_a.to_vec(),
            fields_b: fields_b.to_vec(),
            only_in_a: fields_a.iter().filter(|f| !set_b.contains(f)).cloned().collect(),
            only_in_b: fields_b.iter().filter(|f| !set_a.contains(f)).cloned().collect(),
            common: fields_a.iter().filter(|f| set_b.contains(f)).cloned().collect(),
        }
    }
}

/// Decide which columns are compared.
///
/// * With an explicit field list every name must exist on both sides, and the
///   list is used in the caller's order.
/// * Otherwise the intersection of both sides is taken in side A's column
///   order, minus any excluded names. When the full field sets differ and no
///   exclude list was given either, the result is a [`SchemaMismatch`].
///
/// Primary-key columns of side A that side B also carries are appended when
/// missing, so keyed matching stays possible even when a key was excluded or
/// left out of the explicit list.
pub fn resolve(
    fields_a: &[String],
    fields_b: &[String],
    explicit_fields: &[String],
    exclude_fields: &[String],
    primary_keys_a: &[String],
) -> Result<Resolution> {
    let set_a: HashSet<&String> = fields_a.iter().collect();
    let set_b: HashSet<&String> = fields_b.iter().collect();

    let mut resolved = if !explicit_fields.is_empty() {
        let missing_in_a: Vec<String> = explicit_fields
            .iter()
            .filter(|f| !set_a.contains(f))
            .cloned()
            .collect();
        let missing_in_b: Vec<String> = explicit_fields
            .iter()
            .filter(|f| !set_b.contains(f))
            .cloned()
            .collect();

        if !missing_in_a.is_empty() || !missing_in_b.is_empty() {
            return Err(RowdiffError::FieldNotFound {
                missing_in_a,
                missing_in_b,
            });
        }

        log::info!("Using explicit fields: {:?}", explicit_fields);
        dedup_preserving_order(explicit_fields)
    } else {
        if exclude_fields.is_empty() && set_a != set_b {
            let mismatch = SchemaMismatch::between(fields_a, fields_b);
            log::warn!(
                "Field sets differ: only in table1 {:?}, only in table2 {:?}",
                mismatch.only_in_a,
                mismatch.only_in_b
            );
            return Ok(Resolution::Mismatch(mismatch));
        }

        let common: Vec<String> = dedup_preserving_order(fields_a)
            .into_iter()
            .filter(|f| set_b.contains(f))
            .collect();
        log::debug!("Common fields: {:?}", common);

        for name in exclude_fields {
            if !common.contains(name) {
                log::debug!("Exclude field '{}' is not a common field, ignoring", name);
            }
        }

        common
            .into_iter()
            .filter(|f| !exclude_fields.contains(f))
            .collect()
    };

    for key in primary_keys_a {
        if resolved.contains(key) {
            continue;
        }
        if set_b.contains(key) {
            log::debug!("Adding primary key column '{}' to compared fields", key);
            resolved.push(key.clone());
        } else {
            log::warn!("Primary key column '{}' is not present in table2", key);
        }
    }

    if resolved.is_empty() {
        return Err(RowdiffError::NoComparableFields);
    }

    log::info!("Resolved fields: {:?}", resolved);
    Ok(Resolution::Fields(resolved))
}

fn dedup_preserving_order(fields: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    fields
        .iter()
        .filter(|f| seen.insert(f.as_str()))
        .cloned()
        .collect()
}
