//! Transformity factors: emergy per unit of each resource.

use nalgebra::DVector;
use std::collections::BTreeMap;

/// Weight used for resource columns with no configured transformity.
pub const IDENTITY_WEIGHT: f64 = 1.0;

/// Built-in transformities (seJ per unit).
pub const DEFAULT_TRANSFORMITIES: [(&str, f64); 4] = [
    ("Solar Energy", 1.0),
    ("Wind Energy", 1500.0),
    ("Water", 41000.0),
    ("Raw Material", 100000.0),
];

/// Mapping from resource column name to transformity.
///
/// Values are taken as given: zero and negative factors are accepted.
///
/// # Examples
///
/// ```
/// use emergy::TransformityTable;
///
/// let table = TransformityTable::with_overrides([("Water", 5.0), ("Diesel", 66000.0)]);
/// assert_eq!(table.weight_for("Water"), 5.0);
/// assert_eq!(table.weight_for("Wind Energy"), 1500.0);
/// assert_eq!(table.weight_for("Diesel"), 66000.0);
/// // Unknown resources keep their quantity unweighted
/// assert_eq!(table.weight_for("Sand"), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TransformityTable {
    factors: BTreeMap<String, f64>,
}

impl TransformityTable {
    /// The built-in default set.
    pub fn defaults() -> Self {
        TransformityTable {
            factors: DEFAULT_TRANSFORMITIES
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        }
    }

    /// Defaults merged with `overrides`; overrides win on collision.
    pub fn with_overrides<I, K>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut table = Self::defaults();
        table.factors.extend(overrides.into_iter().map(|(k, v)| (k.into(), v)));
        table
    }

    /// Configured transformity for a column, if any.
    pub fn get(&self, column: &str) -> Option<f64> {
        self.factors.get(column).copied()
    }

    /// Transformity for a column, [`IDENTITY_WEIGHT`] when unconfigured.
    pub fn weight_for(&self, column: &str) -> f64 {
        self.get(column).unwrap_or(IDENTITY_WEIGHT)
    }

    /// Weight vector aligned with the given columns.
    pub fn weights_for<'a, I>(&self, columns: I) -> DVector<f64>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let weights: Vec<f64> = columns.into_iter().map(|c| self.weight_for(c)).collect();
        DVector::from_vec(weights)
    }

    /// Iterates factors in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.factors.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Number of configured factors.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Returns whether no factor is configured.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

impl Default for TransformityTable {
    fn default() -> Self {
        Self::defaults()
    }
}
