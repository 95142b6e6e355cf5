//! Transformity-weighted emergy calculation.
//!
//! For an LCI matrix with numeric resource columns `c` and transformities
//! `w(c)`, the emergy of row `r` is
//!
//! ```text
//! E(r) = sum_c value(r, c) * w(c)
//! ```
//!
//! and the total emergy is the sum over all rows. Columns without a
//! configured transformity are weighted by 1.0. Text attribute columns are
//! ignored.
//!
//! # Network Calculations
//!
//! [`EmergyCalculator::calculate_network_emergy`] weights an input matrix and
//! a process matrix with the same transformity table. The two results are
//! independent of each other.
//!
//! ```
//! use emergy::{EmergyCalculator, LciMatrix};
//!
//! let inputs = LciMatrix::from_numeric_columns(
//!     ["I1", "I2"],
//!     [("Entrada1", vec![1.0, 2.0]), ("Entrada2", vec![2.0, 3.0])],
//! )?;
//! let processes = LciMatrix::from_numeric_columns(
//!     ["P1", "P2"],
//!     [("Processo1", vec![3.0, 4.0]), ("Processo2", vec![4.0, 5.0])],
//! )?;
//!
//! let mut calculator = EmergyCalculator::new();
//! calculator.set_transformity_factors([
//!     ("Entrada1", 2.0),
//!     ("Entrada2", 3.0),
//!     ("Processo1", 4.0),
//!     ("Processo2", 5.0),
//! ]);
//!
//! let (input, process) = calculator.calculate_network_emergy(&inputs, &processes)?;
//! assert_eq!(input.row_emergy(), &[8.0, 13.0]);
//! assert_eq!(process.row_emergy(), &[32.0, 41.0]);
//! # Ok::<(), emergy::LciError>(())
//! ```

mod export;
mod result;
mod transformity;

pub use export::{
    metadata_path, metadata_table, results_table, write_result, METADATA_HEADERS,
    METADATA_SHEET, RESULTS_HEADERS, RESULTS_SHEET,
};
pub use result::{EmergyResult, ProcessEmergy, ResultKey, ResultMetadata};
pub use transformity::{TransformityTable, DEFAULT_TRANSFORMITIES, IDENTITY_WEIGHT};

use crate::matrix::LciMatrix;
use crate::{LciError, LciResult};
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Weighted sum of each row: `values * weights`.
///
/// # Errors
///
/// [`LciError::DimensionMismatch`] if there is not exactly one weight per column.
pub fn weighted_row_sums(values: &DMatrix<f64>, weights: &DVector<f64>) -> LciResult<DVector<f64>> {
    if values.ncols() != weights.len() {
        return Err(LciError::DimensionMismatch { expected: values.ncols(), found: weights.len() });
    }
    Ok(values * weights)
}

/// Owns the active transformity table and the stored results.
#[derive(Debug, Clone, Default)]
pub struct EmergyCalculator {
    transformity: TransformityTable,
    results: BTreeMap<ResultKey, EmergyResult>,
}

impl EmergyCalculator {
    /// Creates a calculator seeded with the default transformities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active table with the defaults merged with `factors`.
    ///
    /// Factors from an earlier call are discarded.
    pub fn set_transformity_factors<I, K>(&mut self, factors: I)
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        self.transformity = TransformityTable::with_overrides(factors);
        debug!(factors = self.transformity.len(), "Transformity table updated");
    }

    /// Active transformity table.
    pub fn transformity(&self) -> &TransformityTable {
        &self.transformity
    }

    /// Weights a matrix and stores the result under [`ResultKey::Latest`].
    pub fn calculate_emergy(&mut self, matrix: &LciMatrix) -> LciResult<EmergyResult> {
        let result = self.evaluate(matrix)?;
        info!(
            rows = result.metadata().rows,
            total = result.total_emergy(),
            "Calculated emergy"
        );
        self.results.insert(ResultKey::Latest, result.clone());
        Ok(result)
    }

    /// Weights an input matrix and a process matrix with the same table.
    ///
    /// Results are stored under [`ResultKey::Input`] and [`ResultKey::Process`];
    /// [`ResultKey::Latest`] ends up holding the process result.
    pub fn calculate_network_emergy(
        &mut self,
        input_matrix: &LciMatrix,
        process_matrix: &LciMatrix,
    ) -> LciResult<(EmergyResult, EmergyResult)> {
        let input = self.calculate_emergy(input_matrix)?;
        let process = self.calculate_emergy(process_matrix)?;
        self.results.insert(ResultKey::Input, input.clone());
        self.results.insert(ResultKey::Process, process.clone());
        Ok((input, process))
    }

    fn evaluate(&self, matrix: &LciMatrix) -> LciResult<EmergyResult> {
        let columns = matrix.numeric_column_names();
        let weights = self.transformity.weights_for(columns.iter().copied());
        let row_emergy = weighted_row_sums(&matrix.numeric_values(), &weights)?;

        let mut process_emergy = ProcessEmergy::new();
        for (process, emergy) in matrix.processes().iter().zip(row_emergy.iter()) {
            if let Some(previous) = process_emergy.record(process, *emergy) {
                debug!(
                    process = %process,
                    previous = previous,
                    emergy = *emergy,
                    "Repeated process identifier, later row wins"
                );
            }
        }

        let metadata = ResultMetadata {
            rows: matrix.n_rows(),
            columns: matrix.n_cols(),
            process_count: matrix.n_rows(),
        };
        Ok(EmergyResult::new(
            row_emergy.iter().copied().collect(),
            process_emergy,
            self.transformity.clone(),
            metadata,
        ))
    }

    /// Gets a stored result. `None` means nothing was stored under `key`.
    pub fn get_result(&self, key: ResultKey) -> Option<&EmergyResult> {
        self.results.get(&key)
    }

    /// Iterates every stored result.
    pub fn results(&self) -> impl Iterator<Item = (ResultKey, &EmergyResult)> + '_ {
        self.results.iter().map(|(key, result)| (*key, result))
    }

    /// Writes a result to disk, see [`write_result`].
    pub fn export_results(&self, result: &EmergyResult, path: impl AsRef<Path>) -> LciResult<()> {
        write_result(result, path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{Cell, RawTable};

    fn ab_matrix() -> LciMatrix {
        LciMatrix::from_numeric_columns(
            ["P1", "P2", "P3"],
            [("A", vec![1.0, 2.0, 3.0]), ("B", vec![2.0, 3.0, 4.0])],
        )
        .unwrap()
    }

    #[test]
    fn test_emergy_calculation() {
        let mut calculator = EmergyCalculator::new();
        calculator.set_transformity_factors([("A", 2.0), ("B", 3.0)]);

        let result = calculator.calculate_emergy(&ab_matrix()).unwrap();

        assert_eq!(result.row_emergy(), &[8.0, 13.0, 18.0]);
        assert_eq!(result.total_emergy(), 39.0);
        assert_eq!(result.process_emergy().get("P2"), Some(13.0));
        assert_eq!(result.metadata().process_count, 3);
        assert_eq!(result.metadata().columns, 3);
        assert_eq!(calculator.get_result(ResultKey::Latest), Some(&result));
    }

    #[test]
    fn test_total_matches_process_breakdown() {
        let mut calculator = EmergyCalculator::new();
        let matrix = LciMatrix::from_numeric_columns(
            ["Farm", "Mill", "Kiln", "Port"],
            [
                ("Solar Energy", vec![1.0e6, 2.5e5, 0.0, 3.0]),
                ("Water", vec![0.5, 1.25, 2.0, 0.0]),
                ("Sand", vec![7.0, 0.0, 1.0, 2.0]),
            ],
        )
        .unwrap();
        let result = calculator.calculate_emergy(&matrix).unwrap();
        let breakdown = result.process_emergy().sum();
        assert!((result.total_emergy() - breakdown).abs() < 1e-9 * breakdown.abs());
    }

    #[test]
    fn test_network_emergy_calculation() {
        let inputs = LciMatrix::from_numeric_columns(
            ["I1", "I2"],
            [("Entrada1", vec![1.0, 2.0]), ("Entrada2", vec![2.0, 3.0])],
        )
        .unwrap();
        let processes = LciMatrix::from_numeric_columns(
            ["P1", "P2"],
            [("Processo1", vec![3.0, 4.0]), ("Processo2", vec![4.0, 5.0])],
        )
        .unwrap();

        let mut calculator = EmergyCalculator::new();
        calculator.set_transformity_factors([
            ("Entrada1", 2.0),
            ("Entrada2", 3.0),
            ("Processo1", 4.0),
            ("Processo2", 5.0),
        ]);
        let (input, process) = calculator.calculate_network_emergy(&inputs, &processes).unwrap();

        assert_eq!(input.row_emergy(), &[8.0, 13.0]);
        assert_eq!(process.row_emergy(), &[32.0, 41.0]);
        assert_eq!(calculator.get_result(ResultKey::Input), Some(&input));
        assert_eq!(calculator.get_result(ResultKey::Process), Some(&process));
        assert_eq!(calculator.get_result(ResultKey::Latest), Some(&process));
    }

    #[test]
    fn test_network_sides_are_independent() {
        let inputs =
            LciMatrix::from_numeric_columns(["I1"], [("Entrada1", vec![1.0])]).unwrap();
        let processes =
            LciMatrix::from_numeric_columns(["P1"], [("Processo1", vec![3.0])]).unwrap();

        let mut calculator = EmergyCalculator::new();
        calculator.set_transformity_factors([("Entrada1", 2.0), ("Processo1", 4.0)]);
        let (input_before, _) = calculator.calculate_network_emergy(&inputs, &processes).unwrap();

        calculator.set_transformity_factors([("Entrada1", 2.0), ("Processo1", 40.0)]);
        let (input_after, process_after) =
            calculator.calculate_network_emergy(&inputs, &processes).unwrap();

        assert_eq!(input_before.row_emergy(), input_after.row_emergy());
        assert_eq!(process_after.row_emergy(), &[120.0]);
    }

    #[test]
    fn test_unset_factor_equals_identity() {
        let mut unset = EmergyCalculator::new();
        unset.set_transformity_factors([("A", 2.0)]);
        let mut identity = EmergyCalculator::new();
        identity.set_transformity_factors([("A", 2.0), ("B", IDENTITY_WEIGHT)]);

        let a = unset.calculate_emergy(&ab_matrix()).unwrap();
        let b = identity.calculate_emergy(&ab_matrix()).unwrap();
        assert_eq!(a.row_emergy(), b.row_emergy());
        assert_eq!(a.total_emergy(), b.total_emergy());
        assert_eq!(a.row_emergy(), &[4.0, 7.0, 10.0]);
    }

    #[test]
    fn test_default_transformities_apply() {
        let matrix = LciMatrix::from_numeric_columns(
            ["Farm"],
            [("Solar Energy", vec![2.0]), ("Wind Energy", vec![1.0]), ("Water", vec![1.0])],
        )
        .unwrap();
        let mut calculator = EmergyCalculator::new();
        let result = calculator.calculate_emergy(&matrix).unwrap();
        assert_eq!(result.total_emergy(), 2.0 + 1500.0 + 41000.0);
    }

    #[test]
    fn test_set_factors_replaces_previous_overrides() {
        let mut calculator = EmergyCalculator::new();
        calculator.set_transformity_factors([("A", 2.0)]);
        calculator.set_transformity_factors([("B", 3.0)]);
        assert_eq!(calculator.transformity().get("A"), None);
        assert_eq!(calculator.transformity().get("B"), Some(3.0));
        assert_eq!(calculator.transformity().get("Water"), Some(41000.0));
    }

    #[test]
    fn test_repeated_process_last_row_wins() {
        let matrix =
            LciMatrix::from_numeric_columns(["Farm", "Mill", "Farm"], [("A", vec![1.0, 2.0, 3.0])])
                .unwrap();
        let mut calculator = EmergyCalculator::new();
        let result = calculator.calculate_emergy(&matrix).unwrap();

        assert_eq!(result.process_emergy().len(), 2);
        assert_eq!(result.process_emergy().get("Farm"), Some(3.0));
        assert_eq!(result.total_emergy(), 6.0);
        assert_eq!(result.metadata().process_count, 3);
    }

    #[test]
    fn test_text_columns_are_ignored() {
        let table = RawTable::from_columns([
            ("Process", vec![Cell::from("Farm")]),
            ("Region", vec![Cell::from("north")]),
            ("A", vec![Cell::from(5.0)]),
        ]);
        let matrix = LciMatrix::from_table(table, "Process").unwrap();
        let mut calculator = EmergyCalculator::new();
        calculator.set_transformity_factors([("A", 2.0), ("Region", 100.0)]);
        let result = calculator.calculate_emergy(&matrix).unwrap();
        assert_eq!(result.total_emergy(), 10.0);
    }

    #[test]
    fn test_result_snapshot_survives_reconfiguration() {
        let mut calculator = EmergyCalculator::new();
        calculator.set_transformity_factors([("A", 2.0)]);
        let first = calculator.calculate_emergy(&ab_matrix()).unwrap();
        calculator.set_transformity_factors([("A", 50.0)]);

        assert_eq!(first.transformity().get("A"), Some(2.0));
        let latest = calculator.get_result(ResultKey::Latest).unwrap();
        assert_eq!(latest.transformity().get("A"), Some(2.0));
    }

    #[test]
    fn test_missing_result_key() {
        let calculator = EmergyCalculator::new();
        assert!(calculator.get_result(ResultKey::Input).is_none());
        assert_eq!(calculator.results().count(), 0);
    }

    #[test]
    fn test_weighted_row_sums_dimension_mismatch() {
        let values = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let weights = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let err = weighted_row_sums(&values, &weights).unwrap_err();
        assert!(matches!(err, LciError::DimensionMismatch { expected: 2, found: 3 }));
    }

    #[test]
    fn test_weighted_row_sums_without_resources() {
        let values = DMatrix::<f64>::zeros(3, 0);
        let weights = DVector::<f64>::zeros(0);
        let sums = weighted_row_sums(&values, &weights).unwrap();
        assert_eq!(sums.as_slice(), &[0.0, 0.0, 0.0]);
    }
}
