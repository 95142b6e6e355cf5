//! Untyped tables as they come off disk, before validation.
//!
//! Readers in [`crate::io`] produce a [`RawTable`]; [`super::LciMatrix::from_table`]
//! turns it into a typed matrix or reports what is wrong with it.

use std::fmt;

/// Text values read as missing data.
pub const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single table cell.
///
/// Delimited readers keep every field as [`Cell::Text`], so identifiers such
/// as `007` survive unchanged. Whether a text cell holds a quantity is decided
/// later by [`Cell::as_number`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing value
    Empty,
    /// Typed number from a workbook or built in memory (never NaN)
    Number(f64),
    /// Field text as read, trimmed
    Text(String),
}

impl Cell {
    /// Classifies a raw text field as missing or text.
    ///
    /// # Examples
    ///
    /// ```
    /// use emergy::Cell;
    ///
    /// assert_eq!(Cell::from_text(" 007 "), Cell::Text("007".to_string()));
    /// assert_eq!(Cell::from_text("n/a"), Cell::Empty);
    /// assert_eq!(Cell::from_text(""), Cell::Empty);
    /// ```
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    /// Returns true for a missing value.
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Gets the numeric value of a number, or of text that parses as one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            Cell::Text(text) => text.parse::<f64>().ok().filter(|v| !v.is_nan()),
            Cell::Empty => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Cell::Empty
        } else {
            Cell::Number(value)
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(value) => write!(f, "{}", value),
            Cell::Text(text) => f.write_str(text),
        }
    }
}

/// A header row plus rectangular rows of cells.
///
/// Rows are always as wide as the header: short rows are padded with
/// [`Cell::Empty`], surplus cells are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Creates a table with the given headers and no rows.
    pub fn new(headers: Vec<String>) -> Self {
        RawTable { headers, rows: Vec::new() }
    }

    /// Builds a table column by column.
    ///
    /// Columns of different lengths are padded with empty cells.
    ///
    /// # Examples
    ///
    /// ```
    /// use emergy::{Cell, RawTable};
    ///
    /// let table = RawTable::from_columns([
    ///     ("Process", vec![Cell::from("Farm"), Cell::from("Mill")]),
    ///     ("Water", vec![Cell::from(2.0)]),
    /// ]);
    /// assert_eq!(table.n_rows(), 2);
    /// assert_eq!(table.rows()[1][1], Cell::Empty);
    /// ```
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<Cell>)>,
        S: Into<String>,
    {
        let (headers, columns): (Vec<String>, Vec<Vec<Cell>>) =
            columns.into_iter().map(|(name, cells)| (name.into(), cells)).unzip();
        let n_rows = columns.iter().map(Vec::len).max().unwrap_or(0);

        let mut table = RawTable::new(headers);
        for i in 0..n_rows {
            let row = columns
                .iter()
                .map(|col| col.get(i).cloned().unwrap_or(Cell::Empty))
                .collect();
            table.push_row(row);
        }
        table
    }

    /// Appends a row, fitting it to the header width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), Cell::Empty);
        self.rows.push(row);
    }

    /// Column headers in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows, excluding the header.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.headers.len()
    }

    /// True when there are no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.headers.is_empty()
    }

    /// Iterates the cells of column `index` from top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Returns true if any cell of the column holds a number.
    ///
    /// A numeric column may still contain stray text; validation reports it.
    pub fn is_numeric_column(&self, index: usize) -> bool {
        self.column(index).any(|cell| cell.as_number().is_some())
    }
}
