//! CSV export of comparison results

use crate::error::{Result, RowdiffError};
use crate::model::ComparisonResult;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Report columns, in order
pub const CSV_HEADER: [&str; 6] = [
    "row_type",
    "key_info",
    "row_number",
    "column_name",
    "table1_value",
    "table2_value",
];

/// Write one CSV line per field-level difference to `writer`.
///
/// The header is always written, even when there are no differences.
pub fn write_csv<W: Write>(result: &ComparisonResult, writer: W) -> std::result::Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CSV_HEADER)?;

    for row_diff in &result.row_differences {
        let key_info = row_diff.key_info();
        let row_number = row_diff.row_number.to_string();
        for diff in &row_diff.differences {
            csv_writer.write_record([
                row_diff.class.as_str(),
                key_info.as_str(),
                row_number.as_str(),
                diff.field.as_str(),
                diff.value_a.to_cell().as_str(),
                diff.value_b.to_cell().as_str(),
            ])?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export a result as a CSV report at `path`.
///
/// The report is written to a sibling `.part` file, synced and renamed into
/// place, so `path` only ever holds a complete report. On failure the partial
/// file is removed and `ReportWriteFailed` is returned.
pub fn export_csv(result: &ComparisonResult, path: &Path) -> Result<()> {
    log::info!("Writing CSV report to {}", path.display());

    let part_path = part_path_for(path);
    if let Err(message) = write_part_file(result, &part_path) {
        let _ = fs::remove_file(&part_path);
        return Err(RowdiffError::report_write(path, message));
    }

    if let Err(e) = fs::rename(&part_path, path) {
        let _ = fs::remove_file(&part_path);
        return Err(RowdiffError::report_write(path, e.to_string()));
    }

    log::info!(
        "CSV report written with {} difference lines",
        result.field_difference_count()
    );
    Ok(())
}

fn write_part_file(result: &ComparisonResult, part_path: &Path) -> std::result::Result<(), String> {
    if let Some(parent) = part_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    let file = File::create(part_path).map_err(|e| e.to_string())?;
    let mut file = std::io::BufWriter::new(file);
    write_csv(result, &mut file).map_err(|e| e.to_string())?;

    let file = file.into_inner().map_err(|e| e.to_string())?;
    file.sync_all().map_err(|e| e.to_string())?;
    Ok(())
}

fn part_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
