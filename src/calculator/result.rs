//! Immutable outputs of emergy calculations.

use super::TransformityTable;
use crate::LciError;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Emergy per process identifier.
///
/// Identifiers are expected to be unique, but repeats are allowed: a later
/// row overwrites the value of an earlier one while the entry keeps the
/// position where the identifier first appeared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessEmergy {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl ProcessEmergy {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the emergy of a process, returning the value it replaced.
    pub fn record(&mut self, process: &str, emergy: f64) -> Option<f64> {
        match self.index.get(process) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, emergy)),
            None => {
                self.index.insert(process.to_string(), self.entries.len());
                self.entries.push((process.to_string(), emergy));
                None
            }
        }
    }

    /// Emergy of a process.
    pub fn get(&self, process: &str) -> Option<f64> {
        self.index.get(process).map(|&i| self.entries[i].1)
    }

    /// Iterates (process, emergy) in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(process, emergy)| (process.as_str(), *emergy))
    }

    /// Number of distinct processes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no process was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum over distinct processes.
    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, emergy)| emergy).sum()
    }
}

/// Shape of the matrix a result was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultMetadata {
    /// Matrix rows
    pub rows: usize,
    /// Matrix columns, identifier included
    pub columns: usize,
    /// Process rows weighted (equal to `rows`, repeats included)
    pub process_count: usize,
}

/// Output of one emergy calculation.
///
/// Holds copies of everything it was computed from, so later changes to
/// the calculator or matrix registry do not affect it.
#[derive(Debug, Clone, PartialEq)]
pub struct EmergyResult {
    total_emergy: f64,
    row_emergy: Vec<f64>,
    process_emergy: ProcessEmergy,
    transformity: TransformityTable,
    calculated_at: DateTime<Local>,
    metadata: ResultMetadata,
}

impl EmergyResult {
    pub(crate) fn new(
        row_emergy: Vec<f64>,
        process_emergy: ProcessEmergy,
        transformity: TransformityTable,
        metadata: ResultMetadata,
    ) -> Self {
        EmergyResult {
            total_emergy: row_emergy.iter().sum(),
            row_emergy,
            process_emergy,
            transformity,
            calculated_at: Local::now(),
            metadata,
        }
    }

    /// Sum of every weighted value in the matrix.
    pub fn total_emergy(&self) -> f64 {
        self.total_emergy
    }

    /// Weighted sum of each row, in row order.
    pub fn row_emergy(&self) -> &[f64] {
        &self.row_emergy
    }

    /// Weighted sum keyed by process identifier.
    pub fn process_emergy(&self) -> &ProcessEmergy {
        &self.process_emergy
    }

    /// Transformity table in effect for this calculation.
    pub fn transformity(&self) -> &TransformityTable {
        &self.transformity
    }

    /// When the calculation ran.
    pub fn calculated_at(&self) -> DateTime<Local> {
        self.calculated_at
    }

    /// Shape of the input matrix.
    pub fn metadata(&self) -> &ResultMetadata {
        &self.metadata
    }
}

/// Slot under which the calculator keeps a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResultKey {
    /// Most recent single-matrix calculation
    Latest,
    /// Input side of the last network calculation
    Input,
    /// Process side of the last network calculation
    Process,
}

impl ResultKey {
    /// All keys, in display order.
    pub const ALL: [ResultKey; 3] = [ResultKey::Latest, ResultKey::Input, ResultKey::Process];

    /// Lowercase name of the key.
    pub fn as_str(self) -> &'static str {
        match self {
            ResultKey::Latest => "latest",
            ResultKey::Input => "input",
            ResultKey::Process => "process",
        }
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultKey {
    type Err = LciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResultKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LciError::UnknownResultKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_process_overwrites_in_place() {
        let mut emergy = ProcessEmergy::new();
        assert_eq!(emergy.record("Farm", 8.0), None);
        assert_eq!(emergy.record("Mill", 13.0), None);
        assert_eq!(emergy.record("Farm", 18.0), Some(8.0));

        assert_eq!(emergy.len(), 2);
        assert_eq!(emergy.get("Farm"), Some(18.0));
        let order: Vec<&str> = emergy.iter().map(|(p, _)| p).collect();
        assert_eq!(order, vec!["Farm", "Mill"]);
        assert_eq!(emergy.sum(), 31.0);
    }

    #[test]
    fn test_result_total_is_row_sum() {
        let result = EmergyResult::new(
            vec![8.0, 13.0, 18.0],
            ProcessEmergy::new(),
            TransformityTable::defaults(),
            ResultMetadata { rows: 3, columns: 3, process_count: 3 },
        );
        assert_eq!(result.total_emergy(), 39.0);
    }

    #[test]
    fn test_result_key_parsing() {
        assert_eq!("latest".parse::<ResultKey>().unwrap(), ResultKey::Latest);
        assert_eq!(" Input ".parse::<ResultKey>().unwrap(), ResultKey::Input);
        assert_eq!("PROCESS".parse::<ResultKey>().unwrap(), ResultKey::Process);
        assert!(matches!("best".parse::<ResultKey>(), Err(LciError::UnknownResultKey(_))));
    }

    #[test]
    fn test_result_key_display() {
        assert_eq!(ResultKey::Process.to_string(), "process");
    }
}
