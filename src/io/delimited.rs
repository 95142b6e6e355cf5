//! Comma- and tab-separated text via the `csv` crate.

use crate::matrix::{Cell, RawTable};
use crate::LciResult;
use std::path::Path;
use tracing::debug;

/// Reads a delimited file whose first record is the header.
///
/// Fields are kept as text; only missing markers are interpreted here.
/// Ragged records are an error.
pub fn read_delimited(path: &Path, delimiter: u8) -> LciResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = RawTable::new(headers);
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(Cell::from_text).collect());
    }
    Ok(table)
}

/// Reads a text file as comma-separated, retrying as tab-separated.
///
/// The retry happens when comma parsing errors, or when it yields a single
/// column whose header still contains tabs.
pub fn read_text(path: &Path) -> LciResult<RawTable> {
    match read_delimited(path, b',') {
        Ok(table) if !looks_tab_separated(&table) => Ok(table),
        Ok(_) => {
            debug!(path = %path.display(), "Single tab-joined column, re-reading as tab-separated");
            read_delimited(path, b'\t')
        }
        Err(err) => {
            debug!(
                path = %path.display(),
                "Comma parse failed ({}), re-reading as tab-separated",
                err
            );
            read_delimited(path, b'\t')
        }
    }
}

fn looks_tab_separated(table: &RawTable) -> bool {
    table.n_cols() == 1 && table.headers()[0].contains('\t')
}

/// Writes a table as delimited text, header first.
pub fn write_delimited(table: &RawTable, path: &Path, delimiter: u8) -> LciResult<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer.flush()?;
    Ok(())
}
