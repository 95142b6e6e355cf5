//! Result export.
//!
//! CSV output is split into two sibling files, `<stem>.csv` with the
//! per-process values and `<stem>_metadata.csv` with a single summary row.
//! Workbook output keeps both tables as sheets of one file.

use super::EmergyResult;
use crate::io::{self, FileFormat};
use crate::matrix::{Cell, RawTable};
use crate::{LciError, LciResult};
use std::path::{Path, PathBuf};
use tracing::info;

/// Worksheet holding the per-process values.
pub const RESULTS_SHEET: &str = "Resultados";
/// Worksheet holding the summary row.
pub const METADATA_SHEET: &str = "Metadados";
/// Columns of the per-process table.
pub const RESULTS_HEADERS: [&str; 2] = ["Process", "Emergy"];
/// Columns of the summary table.
pub const METADATA_HEADERS: [&str; 3] = ["Total Emergia", "Data Cálculo", "Número de Processos"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// One row per distinct process, in first-appearance order.
pub fn results_table(result: &EmergyResult) -> RawTable {
    let mut table = RawTable::new(RESULTS_HEADERS.map(String::from).to_vec());
    for (process, emergy) in result.process_emergy().iter() {
        table.push_row(vec![Cell::Text(process.to_string()), Cell::Number(emergy)]);
    }
    table
}

/// Single summary row: total, timestamp and process count.
pub fn metadata_table(result: &EmergyResult) -> RawTable {
    let mut table = RawTable::new(METADATA_HEADERS.map(String::from).to_vec());
    table.push_row(vec![
        Cell::Number(result.total_emergy()),
        Cell::Text(result.calculated_at().format(TIMESTAMP_FORMAT).to_string()),
        Cell::Number(result.metadata().process_count as f64),
    ]);
    table
}

/// Sibling path of the CSV summary file: `out/run.csv` → `out/run_metadata.csv`.
pub fn metadata_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    path.with_file_name(format!("{stem}_metadata.csv"))
}

/// Writes a result as CSV (two files) or as a two-sheet workbook.
///
/// # Errors
///
/// [`LciError::UnsupportedFormat`] for any extension other than `.csv`,
/// `.xlsx` or `.xls`.
pub fn write_result(result: &EmergyResult, path: &Path) -> LciResult<()> {
    let results = results_table(result);
    let metadata = metadata_table(result);

    match FileFormat::from_path(path)? {
        FileFormat::Csv => {
            let summary = metadata_path(path);
            io::write_delimited(&results, path, b',')?;
            io::write_delimited(&metadata, &summary, b',')?;
            info!(path = %path.display(), metadata = %summary.display(), "Exported emergy results");
        }
        FileFormat::Spreadsheet => {
            io::write_workbook(path, &[(RESULTS_SHEET, &results), (METADATA_SHEET, &metadata)])?;
            info!(path = %path.display(), "Exported emergy results");
        }
        FileFormat::Text | FileFormat::Tsv => {
            return Err(LciError::UnsupportedFormat(path.display().to_string()));
        }
    }
    Ok(())
}
