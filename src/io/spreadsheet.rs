//! Excel workbooks: `calamine` for reading, `rust_xlsxwriter` for writing.

use crate::matrix::{Cell, RawTable};
use crate::{LciError, LciResult};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::Path;

fn workbook_error(err: impl std::fmt::Display) -> LciError {
    LciError::Spreadsheet(err.to_string())
}

/// Reads the first worksheet; its first row is the header.
///
/// A workbook with no sheets, or an empty first sheet, yields an empty table.
pub fn read_first_sheet(path: &Path) -> LciResult<RawTable> {
    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(workbook_error)?,
        None => return Ok(RawTable::default()),
    };

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header) => header.iter().map(|d| d.to_string().trim().to_string()).collect(),
        None => return Ok(RawTable::default()),
    };

    let mut table = RawTable::new(headers);
    for row in rows {
        table.push_row(row.iter().map(cell_from_data).collect());
    }
    Ok(table)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Float(value) => Cell::from(*value),
        Data::Int(value) => Cell::from(*value as f64),
        Data::String(text) => Cell::from_text(text),
        other => Cell::Text(other.to_string()),
    }
}

/// Writes each named table to its own worksheet, in order.
pub fn write_sheets(path: &Path, sheets: &[(&str, &RawTable)]) -> LciResult<()> {
    let mut workbook = Workbook::new();
    for (name, table) in sheets {
        write_sheet(&mut workbook, name, table).map_err(workbook_error)?;
    }
    workbook.save(path).map_err(workbook_error)
}

fn write_sheet(workbook: &mut Workbook, name: &str, table: &RawTable) -> Result<(), XlsxError> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name)?;

    for (col, header) in table.headers().iter().enumerate() {
        worksheet.write_string(0, column_index(col)?, header.as_str())?;
    }
    for (i, row) in table.rows().iter().enumerate() {
        let row_index = u32::try_from(i + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, cell) in row.iter().enumerate() {
            let col = column_index(col)?;
            match cell {
                Cell::Empty => {}
                Cell::Number(value) => {
                    worksheet.write_number(row_index, col, *value)?;
                }
                Cell::Text(text) => {
                    worksheet.write_string(row_index, col, text.as_str())?;
                }
            }
        }
    }
    Ok(())
}

fn column_index(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}
