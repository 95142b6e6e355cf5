//! LCI matrices: validation, typed storage and the named registry.
//!
//! An LCI matrix has one identifier column (by default `"Process"`) naming
//! each row, plus resource columns holding the quantity of each resource a
//! process consumes. Before a table becomes an [`LciMatrix`] it must satisfy:
//!
//! - at least one row and one column
//! - exactly one identifier column, and no other column name repeated
//! - no missing values
//! - no negative value and no stray text in a numeric column
//!
//! A column is numeric as soon as one of its cells holds a number. Columns
//! with no number at all are kept as text attributes; they survive export but
//! are ignored by the emergy calculation. Identifier values are kept exactly as
//! read.
//!
//! ## Example
//!
//! ```
//! use emergy::matrix::{validation_issues, LciMatrix, ValidationIssue, DEFAULT_IDENTIFIER_COLUMN};
//! use emergy::{Cell, RawTable};
//!
//! let table = RawTable::from_columns([
//!     ("Process", vec![Cell::from("Farm"), Cell::from("Mill")]),
//!     ("Water", vec![Cell::from(2.0), Cell::from(-1.0)]),
//! ]);
//!
//! let issues = validation_issues(&table, DEFAULT_IDENTIFIER_COLUMN);
//! assert!(matches!(issues[0], ValidationIssue::NegativeValue { row: 1, .. }));
//! assert!(LciMatrix::from_table(table, DEFAULT_IDENTIFIER_COLUMN).is_err());
//! ```

mod manager;
mod table;

pub use manager::{ColumnStats, MatrixManager, MatrixMetadata, MatrixSummary};
pub use table::{Cell, RawTable, MISSING_MARKERS};

use crate::{LciError, LciResult};
use nalgebra::DMatrix;
use std::collections::HashSet;
use std::fmt;

/// Name of the process identifier column unless configured otherwise.
pub const DEFAULT_IDENTIFIER_COLUMN: &str = "Process";

/// A single violated matrix invariant.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// No data rows or no columns
    Empty,
    /// Identifier column absent
    MissingIdentifierColumn(String),
    /// Identifier column appears more than once
    DuplicateIdentifierColumn(String),
    /// Resource column name appears more than once
    DuplicateColumn(String),
    /// Missing value at a data row (0-based)
    NullValue { column: String, row: usize },
    /// Negative quantity in a numeric column
    NegativeValue { column: String, row: usize, value: f64 },
    /// Text that is not a number in a numeric column
    NonNumericValue { column: String, row: usize, text: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Empty => write!(f, "table has no rows or no columns"),
            ValidationIssue::MissingIdentifierColumn(name) => {
                write!(f, "missing identifier column '{}'", name)
            }
            ValidationIssue::DuplicateIdentifierColumn(name) => {
                write!(f, "identifier column '{}' appears more than once", name)
            }
            ValidationIssue::DuplicateColumn(name) => {
                write!(f, "column '{}' appears more than once", name)
            }
            ValidationIssue::NullValue { column, row } => {
                write!(f, "missing value in column '{}' at row {}", column, row)
            }
            ValidationIssue::NegativeValue { column, row, value } => {
                write!(f, "negative value {} in column '{}' at row {}", value, column, row)
            }
            ValidationIssue::NonNumericValue { column, row, text } => {
                write!(f, "non-numeric value '{}' in column '{}' at row {}", text, column, row)
            }
        }
    }
}

/// Lists every invariant the table violates, in a stable order.
///
/// An empty list means the table is a valid LCI matrix.
pub fn validation_issues(table: &RawTable, identifier: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if table.is_empty() {
        issues.push(ValidationIssue::Empty);
    }

    match table.headers().iter().filter(|h| h.as_str() == identifier).count() {
        0 => issues.push(ValidationIssue::MissingIdentifierColumn(identifier.to_string())),
        1 => {}
        _ => issues.push(ValidationIssue::DuplicateIdentifierColumn(identifier.to_string())),
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for name in table.headers().iter().filter(|h| h.as_str() != identifier) {
        if !seen.insert(name) && reported.insert(name) {
            issues.push(ValidationIssue::DuplicateColumn(name.clone()));
        }
    }

    for (col, name) in table.headers().iter().enumerate() {
        let numeric = name != identifier && table.is_numeric_column(col);
        for (row, cell) in table.column(col).enumerate() {
            if cell.is_empty() {
                issues.push(ValidationIssue::NullValue { column: name.clone(), row });
                continue;
            }
            if !numeric {
                continue;
            }
            match cell.as_number() {
                Some(value) if value < 0.0 => {
                    issues.push(ValidationIssue::NegativeValue { column: name.clone(), row, value })
                }
                Some(_) => {}
                None => issues.push(ValidationIssue::NonNumericValue {
                    column: name.clone(),
                    row,
                    text: cell.to_string(),
                }),
            }
        }
    }

    issues
}

/// Returns true if the table satisfies every LCI matrix invariant.
pub fn is_valid(table: &RawTable, identifier: &str) -> bool {
    validation_issues(table, identifier).is_empty()
}

/// Values of a resource column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Resource quantities, weighted by the calculator
    Numeric(Vec<f64>),
    /// Descriptive attribute, carried through but never weighted
    Text(Vec<String>),
}

/// A named resource column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    /// Gets the numeric values if this is a resource quantity column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(values) => Some(values),
            ColumnData::Text(_) => None,
        }
    }
}

/// A validated, immutable LCI matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct LciMatrix {
    /// Name of the identifier column
    identifier: String,
    /// Position of the identifier column in the source table
    identifier_position: usize,
    /// Process identifiers, one per row
    processes: Vec<String>,
    /// Every other column, in source order
    columns: Vec<Column>,
}

impl LciMatrix {
    /// Validates a raw table and converts it into a typed matrix.
    ///
    /// Fails with [`LciError::Validation`] listing every violated invariant.
    pub fn from_table(table: RawTable, identifier: &str) -> LciResult<Self> {
        let issues = validation_issues(&table, identifier);
        if !issues.is_empty() {
            return Err(LciError::Validation(issues));
        }

        let mut identifier_position = 0;
        let mut processes = Vec::new();
        let mut columns = Vec::new();

        for (col, name) in table.headers().iter().enumerate() {
            if name == identifier {
                identifier_position = col;
                processes = table.column(col).map(ToString::to_string).collect();
                continue;
            }
            let data = if table.is_numeric_column(col) {
                ColumnData::Numeric(table.column(col).filter_map(Cell::as_number).collect())
            } else {
                ColumnData::Text(table.column(col).map(ToString::to_string).collect())
            };
            columns.push(Column { name: name.clone(), data });
        }

        Ok(LciMatrix {
            identifier: identifier.to_string(),
            identifier_position,
            processes,
            columns,
        })
    }

    /// Builds a matrix from process names and numeric resource columns.
    ///
    /// The identifier column is [`DEFAULT_IDENTIFIER_COLUMN`] and comes first.
    pub fn from_numeric_columns<P, S, C, N>(processes: P, columns: C) -> LciResult<Self>
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
        C: IntoIterator<Item = (N, Vec<f64>)>,
        N: Into<String>,
    {
        let identifier_cells: Vec<Cell> =
            processes.into_iter().map(|p| Cell::Text(p.into())).collect();
        let resource_columns = columns
            .into_iter()
            .map(|(name, values)| (name.into(), values.into_iter().map(Cell::from).collect()));

        let table = RawTable::from_columns(
            std::iter::once((DEFAULT_IDENTIFIER_COLUMN.to_string(), identifier_cells))
                .chain(resource_columns),
        );
        LciMatrix::from_table(table, DEFAULT_IDENTIFIER_COLUMN)
    }

    /// Name of the identifier column.
    pub fn identifier_column(&self) -> &str {
        &self.identifier
    }

    /// Process identifiers in row order. May contain repeats.
    pub fn processes(&self) -> &[String] {
        &self.processes
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.processes.len()
    }

    /// Number of columns, identifier included.
    pub fn n_cols(&self) -> usize {
        self.columns.len() + 1
    }

    /// All non-identifier columns in source order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a non-identifier column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Iterates the numeric resource columns in source order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.columns.iter().filter_map(|c| c.as_numeric().map(|values| (c.name.as_str(), values)))
    }

    /// Names of the numeric resource columns in source order.
    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.numeric_columns().map(|(name, _)| name).collect()
    }

    /// Numeric resource values as a rows x resources matrix.
    pub fn numeric_values(&self) -> DMatrix<f64> {
        let numeric: Vec<&[f64]> = self.numeric_columns().map(|(_, values)| values).collect();
        DMatrix::from_fn(self.n_rows(), numeric.len(), |row, col| numeric[col][row])
    }

    /// Converts back to a raw table with the original column order.
    pub fn to_table(&self) -> RawTable {
        let identifier_cells: Vec<Cell> =
            self.processes.iter().map(|p| Cell::Text(p.clone())).collect();
        let mut named: Vec<(String, Vec<Cell>)> = self
            .columns
            .iter()
            .map(|c| {
                let cells = match &c.data {
                    ColumnData::Numeric(values) => values.iter().copied().map(Cell::from).collect(),
                    ColumnData::Text(values) => {
                        values.iter().map(|v| Cell::Text(v.clone())).collect()
                    }
                };
                (c.name.clone(), cells)
            })
            .collect();
        named.insert(self.identifier_position, (self.identifier.clone(), identifier_cells));
        RawTable::from_columns(named)
    }
}
