//! # Emergy: Transformity-Weighted Accounting for LCI Matrices
//!
//! Computes emergy (energy memory) values for life-cycle-inventory process
//! data. An LCI matrix lists one process per row and the quantity of each
//! resource it consumes per column; every resource column is weighted by its
//! transformity and summed per process.
//!
//! The crate is organised around two managers:
//!
//! - [`matrix::MatrixManager`]: imports, validates and serves named LCI matrices
//! - [`calculator::EmergyCalculator`]: owns the transformity table, runs the
//!   weighted sum and keeps the latest results
//!
//! ## Example
//!
//! ```
//! use emergy::calculator::EmergyCalculator;
//! use emergy::matrix::LciMatrix;
//!
//! let matrix = LciMatrix::from_numeric_columns(
//!     ["Farm", "Mill", "Bakery"],
//!     [("A", vec![1.0, 2.0, 3.0]), ("B", vec![2.0, 3.0, 4.0])],
//! )?;
//!
//! let mut calculator = EmergyCalculator::new();
//! calculator.set_transformity_factors([("A", 2.0), ("B", 3.0)]);
//!
//! let result = calculator.calculate_emergy(&matrix)?;
//! assert_eq!(result.row_emergy(), &[8.0, 13.0, 18.0]);
//! assert_eq!(result.total_emergy(), 39.0);
//! assert_eq!(result.process_emergy().get("Mill"), Some(13.0));
//! # Ok::<(), emergy::LciError>(())
//! ```
//!
//! ## Optional Features
//!
//! - **`spreadsheet`** (default): `.xlsx`/`.xls` import and export using
//!   `calamine` and `rust_xlsxwriter`
//! - **`cli`** (default): the `emergy` command-line binary
//!
//! Without `spreadsheet`, workbook paths fail with
//! [`LciError::FeatureNotEnabled`].

use std::path::PathBuf;

pub mod calculator;
pub mod config;
pub mod io;
pub mod matrix;

pub use calculator::{EmergyCalculator, EmergyResult, ResultKey, TransformityTable};
pub use config::Config;
pub use matrix::{Cell, LciMatrix, MatrixManager, RawTable, ValidationIssue};

/// Result type for matrix and emergy operations.
pub type LciResult<T> = Result<T, LciError>;

/// Errors that can occur while importing, validating, calculating or exporting.
#[derive(Debug, thiserror::Error)]
pub enum LciError {
    /// Input path does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    /// File extension is not a recognised tabular format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// Table breaks one or more LCI matrix invariants
    #[error("Invalid LCI matrix: {}", describe_issues(.0))]
    Validation(Vec<ValidationIssue>),
    /// Weight vector does not line up with the resource columns
    #[error("Dimension mismatch: {expected} resource columns but {found} weights")]
    DimensionMismatch { expected: usize, found: usize },
    /// No matrix registered under this name
    #[error("LCI matrix not found: {0}")]
    MatrixNotFound(String),
    /// Result key is not one of `latest`, `input`, `process`
    #[error("Unknown result key: {0}")]
    UnknownResultKey(String),
    /// Operation needs a cargo feature that was compiled out
    #[error("Operation requires the '{0}' feature to be enabled")]
    FeatureNotEnabled(&'static str),
    /// Underlying filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed delimited text
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Workbook could not be read or written
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
}

fn describe_issues(issues: &[ValidationIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
