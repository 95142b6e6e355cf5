//! Reading and writing tabular files.
//!
//! The file extension picks the format:
//!
//! | Extension | Read | Write |
//! |-----------|------|-------|
//! | `.csv` | comma-separated | comma-separated |
//! | `.txt` | comma-separated, falling back to tab-separated | tab-separated |
//! | `.tsv` | tab-separated | tab-separated |
//! | `.xlsx`, `.xls` | first worksheet | one worksheet per table |
//!
//! Workbook support needs the `spreadsheet` feature.

mod delimited;
#[cfg(feature = "spreadsheet")]
mod spreadsheet;

pub use delimited::{read_delimited, read_text, write_delimited};

use crate::matrix::RawTable;
use crate::{LciError, LciResult};
use std::path::Path;

/// Tabular file formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma-separated values
    Csv,
    /// Plain text, comma- or tab-separated
    Text,
    /// Tab-separated values
    Tsv,
    /// Excel workbook
    Spreadsheet,
}

impl FileFormat {
    /// Detects the format from a path's extension (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use emergy::io::FileFormat;
    ///
    /// assert_eq!(FileFormat::from_path("lci.CSV".as_ref()).unwrap(), FileFormat::Csv);
    /// assert!(FileFormat::from_path("lci.json".as_ref()).is_err());
    /// ```
    pub fn from_path(path: &Path) -> LciResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "txt" => Ok(FileFormat::Text),
            "tsv" => Ok(FileFormat::Tsv),
            "xlsx" | "xls" => Ok(FileFormat::Spreadsheet),
            _ => Err(LciError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Field delimiter used when writing this format as text.
    pub fn delimiter(self) -> Option<u8> {
        match self {
            FileFormat::Csv => Some(b','),
            FileFormat::Text | FileFormat::Tsv => Some(b'\t'),
            FileFormat::Spreadsheet => None,
        }
    }
}

/// Reads a table from disk.
///
/// Existence is checked before the extension, so a missing `.json` file is
/// reported as [`LciError::FileNotFound`].
pub fn read_table(path: &Path) -> LciResult<RawTable> {
    if !path.exists() {
        return Err(LciError::FileNotFound(path.to_path_buf()));
    }
    match FileFormat::from_path(path)? {
        FileFormat::Csv => read_delimited(path, b','),
        FileFormat::Tsv => read_delimited(path, b'\t'),
        FileFormat::Text => read_text(path),
        FileFormat::Spreadsheet => read_workbook(path),
    }
}

/// Writes a single table to disk.
pub fn write_table(table: &RawTable, path: &Path) -> LciResult<()> {
    let format = FileFormat::from_path(path)?;
    match format.delimiter() {
        Some(delimiter) => write_delimited(table, path, delimiter),
        None => write_workbook(path, &[("Sheet1", table)]),
    }
}

/// Reads the first worksheet of a workbook.
#[cfg(feature = "spreadsheet")]
pub fn read_workbook(path: &Path) -> LciResult<RawTable> {
    spreadsheet::read_first_sheet(path)
}

/// Reads the first worksheet of a workbook.
#[cfg(not(feature = "spreadsheet"))]
pub fn read_workbook(_path: &Path) -> LciResult<RawTable> {
    Err(LciError::FeatureNotEnabled("spreadsheet"))
}

/// Writes named tables as worksheets of one workbook.
#[cfg(feature = "spreadsheet")]
pub fn write_workbook(path: &Path, sheets: &[(&str, &RawTable)]) -> LciResult<()> {
    spreadsheet::write_sheets(path, sheets)
}

/// Writes named tables as worksheets of one workbook.
#[cfg(not(feature = "spreadsheet"))]
pub fn write_workbook(_path: &Path, _sheets: &[(&str, &RawTable)]) -> LciResult<()> {
    Err(LciError::FeatureNotEnabled("spreadsheet"))
}
