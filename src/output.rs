//! Output formatting utilities

use crate::error::Result;
use crate::model::{ComparisonResult, RowClass, RowDifference, Summary};
use crate::query::Source;
use std::fmt::Write as _;

/// Number of differing rows listed when `--detailed` is not given
const SAMPLE_ROWS: usize = 3;

/// Pretty printer for rowdiff output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print a comparison result
    pub fn print_comparison(result: &ComparisonResult, detailed: bool) {
        print!("{}", Self::render_comparison(result, detailed));
    }

    /// Render a comparison result as a tree
    pub fn render_comparison(result: &ComparisonResult, detailed: bool) -> String {
        let mut out = String::new();

        if let Some(Summary::FieldMismatch {
            only_in_a,
            only_in_b,
            common,
        }) = result.summaries.first()
        {
            let _ = writeln!(out, "🔍 Field sets differ, no rows compared");
            let _ = writeln!(out, "├─ Only in table1: {}", list_or_none(only_in_a));
            let _ = writeln!(out, "├─ Only in table2: {}", list_or_none(only_in_b));
            let _ = writeln!(out, "├─ Common: {}", list_or_none(common));
            let _ = writeln!(out, "└─ Use --fields or --exclude to choose the columns to compare");
            return out;
        }

        let _ = writeln!(out, "🔍 Comparison Results");
        let _ = writeln!(out, "├─ Fields: {}", result.fields.join(", "));
        let _ = writeln!(out, "├─ Table1 rows: {}", result.row_count_a);
        let _ = writeln!(out, "├─ Table2 rows: {}", result.row_count_b);

        if !result.has_differences() {
            let _ = writeln!(out, "└─ ✅ No differences");
            return out;
        }

        for summary in &result.summaries {
            let _ = writeln!(out, "├─ ❌ {}", summary);
        }

        let _ = writeln!(
            out,
            "├─ Different data: {}, only in table1: {}, only in table2: {}",
            result.count_by_class(RowClass::DifferentData),
            result.count_by_class(RowClass::OnlyInA),
            result.count_by_class(RowClass::OnlyInB)
        );

        if let Some(first) = result.row_differences.first() {
            let _ = writeln!(out, "├─ First difference at row {}", describe_row(first));
        }

        let shown = if detailed {
            result.row_differences.len()
        } else {
            SAMPLE_ROWS.min(result.row_differences.len())
        };
        let hidden = result.row_differences.len() - shown;

        let _ = writeln!(out, "└─ Row differences:");
        for (i, row) in result.row_differences.iter().take(shown).enumerate() {
            let is_last = i + 1 == shown && hidden == 0;
            let (marker, indent) = if is_last { ("└─", "   ") } else { ("├─", "│  ") };
            let _ = writeln!(out, "   {} [{}] row {}", marker, row.class, describe_row(row));

            for (j, diff) in row.differences.iter().enumerate() {
                let diff_marker = if j + 1 == row.differences.len() { "└─" } else { "├─" };
                let _ = writeln!(
                    out,
                    "   {}{} {}: {} → {}",
                    indent, diff_marker, diff.field, diff.value_a, diff.value_b
                );
            }
        }

        if hidden > 0 {
            let _ = writeln!(
                out,
                "   └─ ... and {} more (use --detailed or --csv-report)",
                hidden
            );
        }

        out
    }

    /// Print the structure of a source
    pub fn print_fields(source: &Source, fields: &[String], primary_keys: &[String]) {
        println!("📋 {}", source);
        println!("├─ Primary key: {}", list_or_none(primary_keys));
        println!("└─ Columns: {}", fields.len());
        for (i, field) in fields.iter().enumerate() {
            let prefix = if i == fields.len() - 1 { "   └─" } else { "   ├─" };
            let marker = if primary_keys.contains(field) { " (pk)" } else { "" };
            println!("{} {}{}", prefix, field, marker);
        }
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Format the structure of a source as JSON
    pub fn format_fields(source: &Source, fields: &[String], primary_keys: &[String]) -> Result<String> {
        let json = serde_json::json!({
            "source": source,
            "fields": fields,
            "primary_keys": primary_keys,
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

fn describe_row(row: &RowDifference) -> String {
    match &row.key {
        Some(key) => format!("{} ({})", row.row_number, key),
        None => row.row_number.to_string(),
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
