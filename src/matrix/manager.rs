//! Named registry of imported LCI matrices.

use super::{
    is_valid, validation_issues, LciMatrix, RawTable, ValidationIssue, DEFAULT_IDENTIFIER_COLUMN,
};
use crate::io;
use crate::{LciError, LciResult};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Provenance of a registered matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixMetadata {
    /// File the matrix was imported from (None for in-memory registration)
    pub source: Option<PathBuf>,
    /// When the matrix was registered
    pub imported_at: DateTime<Local>,
    /// Number of rows
    pub rows: usize,
    /// Number of columns, identifier included
    pub columns: usize,
}

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub mean: f64,
    /// Sample standard deviation; None for a single row
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Computes statistics for a non-empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std_dev = if values.len() > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            Some((ss / (n - 1.0)).sqrt())
        } else {
            None
        };
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(ColumnStats { mean, std_dev, min, max })
    }
}

/// Shape and per-column statistics of a matrix, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixSummary {
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: usize,
    /// Statistics per numeric column, in column order
    pub column_stats: Vec<(String, ColumnStats)>,
}

impl MatrixSummary {
    /// Summarises a matrix.
    pub fn of(matrix: &LciMatrix) -> Self {
        let column_stats: Vec<(String, ColumnStats)> = matrix
            .numeric_columns()
            .filter_map(|(name, values)| {
                ColumnStats::from_values(values).map(|s| (name.to_string(), s))
            })
            .collect();
        MatrixSummary {
            total_rows: matrix.n_rows(),
            total_columns: matrix.n_cols(),
            numeric_columns: column_stats.len(),
            column_stats,
        }
    }

    /// Gets the statistics of a column by name.
    pub fn stats(&self, column: &str) -> Option<&ColumnStats> {
        self.column_stats.iter().find(|(name, _)| name == column).map(|(_, s)| s)
    }
}

/// Owns imported LCI matrices under caller-chosen names.
///
/// Registration is atomic: a table that fails to read or validate leaves the
/// registry, the metadata and the current matrix exactly as they were.
/// Re-registering a name replaces the previous matrix wholesale.
///
/// # Examples
///
/// ```
/// use emergy::{Cell, MatrixManager, RawTable};
///
/// let mut manager = MatrixManager::new();
/// let table = RawTable::from_columns([
///     ("Process", vec![Cell::from("Farm")]),
///     ("Water", vec![Cell::from(3.0)]),
/// ]);
///
/// manager.register("farm", table).unwrap();
/// assert_eq!(manager.list_matrices(), vec!["farm".to_string()]);
/// assert_eq!(manager.get_matrix(None).unwrap().n_rows(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MatrixManager {
    identifier_column: String,
    matrices: HashMap<String, LciMatrix>,
    metadata: HashMap<String, MatrixMetadata>,
    current: Option<String>,
}

impl MatrixManager {
    /// Creates an empty manager using the default `"Process"` identifier column.
    pub fn new() -> Self {
        Self::with_identifier_column(DEFAULT_IDENTIFIER_COLUMN)
    }

    /// Creates an empty manager expecting a differently named identifier column.
    pub fn with_identifier_column(identifier: impl Into<String>) -> Self {
        MatrixManager {
            identifier_column: identifier.into(),
            matrices: HashMap::new(),
            metadata: HashMap::new(),
            current: None,
        }
    }

    /// Name of the identifier column required on import.
    pub fn identifier_column(&self) -> &str {
        &self.identifier_column
    }

    /// Imports a CSV, text or workbook file and registers it under `name`.
    ///
    /// # Errors
    ///
    /// - [`LciError::FileNotFound`] if the path does not exist
    /// - [`LciError::UnsupportedFormat`] for unrecognised extensions
    /// - [`LciError::Validation`] if the table breaks a matrix invariant
    /// - I/O, CSV or spreadsheet errors while reading
    pub fn import_file(&mut self, path: impl AsRef<Path>, name: &str) -> LciResult<()> {
        let path = path.as_ref();
        let outcome = io::read_table(path)
            .and_then(|table| LciMatrix::from_table(table, &self.identifier_column));

        match outcome {
            Ok(matrix) => {
                info!(
                    matrix = name,
                    path = %path.display(),
                    rows = matrix.n_rows(),
                    columns = matrix.n_cols(),
                    "Imported LCI matrix"
                );
                self.insert(name, matrix, Some(path.to_path_buf()));
                Ok(())
            }
            Err(err) => {
                warn!(
                    matrix = name,
                    path = %path.display(),
                    "Failed to import LCI matrix: {}",
                    err
                );
                Err(err)
            }
        }
    }

    /// Validates an in-memory table and registers it under `name`.
    pub fn register(&mut self, name: &str, table: RawTable) -> LciResult<()> {
        let matrix = LciMatrix::from_table(table, &self.identifier_column).inspect_err(|err| {
            warn!(matrix = name, "Rejected LCI matrix: {}", err);
        })?;
        debug!(matrix = name, rows = matrix.n_rows(), "Registered LCI matrix");
        self.insert(name, matrix, None);
        Ok(())
    }

    fn insert(&mut self, name: &str, matrix: LciMatrix, source: Option<PathBuf>) {
        let metadata = MatrixMetadata {
            source,
            imported_at: Local::now(),
            rows: matrix.n_rows(),
            columns: matrix.n_cols(),
        };
        self.matrices.insert(name.to_string(), matrix);
        self.metadata.insert(name.to_string(), metadata);
        self.current = Some(name.to_string());
    }

    /// Gets a matrix by name, or the current matrix when `name` is None.
    pub fn get_matrix(&self, name: Option<&str>) -> Option<&LciMatrix> {
        match name {
            Some(name) => self.matrices.get(name),
            None => self.current.as_deref().and_then(|n| self.matrices.get(n)),
        }
    }

    /// Name of the most recently registered matrix.
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Names of all registered matrices, sorted.
    pub fn list_matrices(&self) -> Vec<String> {
        let mut names: Vec<String> = self.matrices.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered matrices.
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    /// Returns whether no matrix is registered.
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// Checks a table against the matrix invariants without registering it.
    pub fn validate_matrix(&self, table: &RawTable) -> bool {
        is_valid(table, &self.identifier_column)
    }

    /// Lists the invariants a table violates.
    pub fn validation_issues(&self, table: &RawTable) -> Vec<ValidationIssue> {
        validation_issues(table, &self.identifier_column)
    }

    /// Writes a registered matrix to disk, format chosen by extension.
    ///
    /// # Errors
    ///
    /// - [`LciError::MatrixNotFound`] if `name` is not registered
    /// - [`LciError::UnsupportedFormat`] for unrecognised extensions
    pub fn export_matrix(&self, name: &str, path: impl AsRef<Path>) -> LciResult<()> {
        let path = path.as_ref();
        let matrix =
            self.matrices.get(name).ok_or_else(|| LciError::MatrixNotFound(name.to_string()))?;
        io::write_table(&matrix.to_table(), path).inspect_err(|err| {
            warn!(matrix = name, path = %path.display(), "Failed to export LCI matrix: {}", err);
        })?;
        info!(matrix = name, path = %path.display(), "Exported LCI matrix");
        Ok(())
    }

    /// Gets import provenance of a registered matrix.
    pub fn get_metadata(&self, name: &str) -> Option<&MatrixMetadata> {
        self.metadata.get(name)
    }

    /// Summarises a matrix by name, or the current matrix when `name` is None.
    pub fn get_summary(&self, name: Option<&str>) -> Option<MatrixSummary> {
        self.get_matrix(name).map(MatrixSummary::of)
    }
}

impl Default for MatrixManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;
    use std::fs;
    use tempfile::TempDir;

    fn farm_table(water: f64) -> RawTable {
        RawTable::from_columns([
            ("Process", vec![Cell::from("Farm"), Cell::from("Mill")]),
            ("Water", vec![Cell::from(water), Cell::from(1.0)]),
        ])
    }

    #[test]
    fn test_import_csv_sets_current_and_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("farm.csv");
        fs::write(&path, "Process,Water,Wind Energy\nFarm,2,0.5\nMill,1,3\n").unwrap();

        let mut manager = MatrixManager::new();
        manager.import_file(&path, "farm").unwrap();

        assert_eq!(manager.current_name(), Some("farm"));
        let matrix = manager.get_matrix(None).unwrap();
        assert_eq!(matrix.numeric_column_names(), vec!["Water", "Wind Energy"]);

        let meta = manager.get_metadata("farm").unwrap();
        assert_eq!(meta.source.as_deref(), Some(path.as_path()));
        assert_eq!(meta.rows, 2);
        assert_eq!(meta.columns, 3);
    }

    #[test]
    fn test_failed_imports_leave_state_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut manager = MatrixManager::new();
        manager.register("base", farm_table(2.0)).unwrap();

        let missing = dir.path().join("missing.csv");
        assert!(matches!(manager.import_file(&missing, "x"), Err(LciError::FileNotFound(_))));

        let odd = dir.path().join("data.json");
        fs::write(&odd, "{}").unwrap();
        assert!(matches!(manager.import_file(&odd, "x"), Err(LciError::UnsupportedFormat(_))));

        let negative = dir.path().join("negative.csv");
        fs::write(&negative, "Process,Water\nFarm,-1\n").unwrap();
        assert!(matches!(manager.import_file(&negative, "base"), Err(LciError::Validation(_))));

        assert_eq!(manager.list_matrices(), vec!["base".to_string()]);
        assert_eq!(manager.current_name(), Some("base"));
        assert_eq!(manager.get_matrix(Some("base")).unwrap().numeric_values()[(0, 0)], 2.0);
        assert!(manager.get_metadata("x").is_none());
    }

    #[test]
    fn test_import_rejects_unreadable_quantities() {
        let dir = TempDir::new().unwrap();
        let mut manager = MatrixManager::new();

        let marker = dir.path().join("marker.csv");
        fs::write(&marker, "Process,Water,Solar Energy\nFarm,2,1\nMill,n/a,1\n").unwrap();
        let err = manager.import_file(&marker, "marker").unwrap_err();
        assert!(matches!(
            &err,
            LciError::Validation(issues)
                if issues == &[ValidationIssue::NullValue { column: "Water".to_string(), row: 1 }]
        ));

        let typo = dir.path().join("typo.csv");
        fs::write(&typo, "Process,Water\nFarm,2\nMill,1.5kg\n").unwrap();
        let err = manager.import_file(&typo, "typo").unwrap_err();
        assert!(matches!(
            &err,
            LciError::Validation(issues)
                if matches!(issues[..], [ValidationIssue::NonNumericValue { row: 1, .. }])
        ));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_import_preserves_identifier_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ids.csv");
        fs::write(&path, "Process,Water\nP-A,1\n007,2\n1.0,3\n1,4\n").unwrap();

        let mut manager = MatrixManager::new();
        manager.import_file(&path, "ids").unwrap();
        let matrix = manager.get_matrix(None).unwrap();
        assert_eq!(matrix.processes(), &["P-A", "007", "1.0", "1"].map(String::from));
    }

    #[test]
    fn test_reimport_replaces_entry() {
        let mut manager = MatrixManager::new();
        manager.register("lci", farm_table(2.0)).unwrap();
        manager.register("other", farm_table(4.0)).unwrap();
        manager.register("lci", farm_table(9.0)).unwrap();

        assert_eq!(manager.len(), 2);
        assert_eq!(manager.current_name(), Some("lci"));
        assert_eq!(manager.get_matrix(Some("lci")).unwrap().numeric_values()[(0, 0)], 9.0);
    }

    #[test]
    fn test_register_rejects_invalid_table_atomically() {
        let mut manager = MatrixManager::new();
        manager.register("lci", farm_table(2.0)).unwrap();

        let result = manager.register("lci", farm_table(-2.0));
        assert!(matches!(result, Err(LciError::Validation(_))));
        assert_eq!(manager.get_matrix(Some("lci")).unwrap().numeric_values()[(0, 0)], 2.0);
    }

    #[test]
    fn test_get_matrix_unknown_name() {
        let manager = MatrixManager::new();
        assert!(manager.get_matrix(Some("nope")).is_none());
        assert!(manager.get_matrix(None).is_none());
        assert!(manager.get_summary(None).is_none());
    }

    #[test]
    fn test_custom_identifier_column() {
        let mut manager = MatrixManager::with_identifier_column("Processo");
        let table = RawTable::from_columns([
            ("Processo", vec![Cell::from("Forno")]),
            ("Água", vec![Cell::from(1.0)]),
        ]);
        assert!(manager.validate_matrix(&table));
        assert!(!manager.validate_matrix(&farm_table(1.0)));
        manager.register("forno", table).unwrap();
        assert_eq!(manager.get_matrix(None).unwrap().identifier_column(), "Processo");
    }

    #[test]
    fn test_export_unknown_matrix() {
        let dir = TempDir::new().unwrap();
        let manager = MatrixManager::new();
        let result = manager.export_matrix("ghost", dir.path().join("out.csv"));
        assert!(matches!(result, Err(LciError::MatrixNotFound(_))));
    }

    #[test]
    fn test_export_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let mut manager = MatrixManager::new();
        manager.register("lci", farm_table(2.0)).unwrap();
        let result = manager.export_matrix("lci", dir.path().join("out.parquet"));
        assert!(matches!(result, Err(LciError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_export_then_import_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("copy.csv");
        let mut manager = MatrixManager::new();
        manager.register("lci", farm_table(2.5)).unwrap();
        manager.export_matrix("lci", &path).unwrap();

        manager.import_file(&path, "copy").unwrap();
        assert_eq!(manager.get_matrix(Some("copy")), manager.get_matrix(Some("lci")));
    }

    #[test]
    fn test_summary_statistics() {
        let mut manager = MatrixManager::new();
        let table = RawTable::from_columns([
            ("Process", vec![Cell::from("A"), Cell::from("B"), Cell::from("C")]),
            ("Water", vec![Cell::from(1.0), Cell::from(2.0), Cell::from(3.0)]),
            ("Kind", vec![Cell::from("x"), Cell::from("y"), Cell::from("z")]),
        ]);
        manager.register("lci", table).unwrap();

        let summary = manager.get_summary(Some("lci")).unwrap();
        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.total_columns, 3);
        assert_eq!(summary.numeric_columns, 1);

        let water = summary.stats("Water").unwrap();
        assert_eq!(water.mean, 2.0);
        assert_eq!(water.std_dev, Some(1.0));
        assert_eq!(water.min, 1.0);
        assert_eq!(water.max, 3.0);
        assert!(summary.stats("Kind").is_none());
    }

    #[test]
    fn test_single_row_has_no_std_dev() {
        let stats = ColumnStats::from_values(&[4.0]).unwrap();
        assert_eq!(stats.std_dev, None);
        assert!(ColumnStats::from_values(&[]).is_none());
    }
}
