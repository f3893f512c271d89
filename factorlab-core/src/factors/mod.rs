//! Factor units — named, stateless computations over the joined panel.
//!
//! A factor declares the raw/derived fields it reads and produces one value
//! series on the panel's (date, entity) grid. Units are constructed by the
//! registry and hold no state, so one instance can serve any number of
//! computations.

pub mod momentum;
pub mod price_action;
pub mod registry;
pub mod volume;

use std::collections::BTreeMap;

use crate::domain::{FactorSeries, JoinedPanel};
use crate::ops;

pub use registry::{install_builtin_factors, FactorRegistry, RegistryError};

/// A pluggable factor computation.
pub trait Factor: std::fmt::Debug + Send + Sync {
    /// Registry name of this unit.
    fn name(&self) -> &'static str;

    /// Raw/derived fields the computation reads from the joined panel.
    fn requires(&self) -> &'static [&'static str];

    /// Compute the value series for the panel's full (date, entity) grid.
    fn compute(&self, panel: &JoinedPanel) -> FactorSeries;
}

// ─── Authoring helpers ───────────────────────────────────────────────

/// Per-entity series keyed by entity, all aligned to one date axis.
pub type EntityColumns = BTreeMap<String, Vec<f64>>;

/// One field's series for an entity, NaN-filled when the column is absent.
pub(crate) fn column_or_nan(panel: &JoinedPanel, field: &str, entity: &str) -> Vec<f64> {
    panel
        .column(field, entity)
        .map(<[f64]>::to_vec)
        .unwrap_or_else(|| vec![f64::NAN; panel.dates().len()])
}

/// Apply a per-entity series transform to one field of the joined panel.
pub fn per_entity<F>(panel: &JoinedPanel, field: &str, f: F) -> EntityColumns
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    panel
        .entities()
        .iter()
        .map(|e| (e.clone(), f(&column_or_nan(panel, field, e))))
        .collect()
}

/// One field's per-entity columns, unchanged.
pub fn columns(panel: &JoinedPanel, field: &str) -> EntityColumns {
    per_entity(panel, field, <[f64]>::to_vec)
}

/// Elementwise combination of two aligned column sets.
pub fn zip_with<F>(a: &EntityColumns, b: &EntityColumns, f: F) -> EntityColumns
where
    F: Fn(f64, f64) -> f64,
{
    a.iter()
        .map(|(entity, xs)| {
            let col = match b.get(entity) {
                Some(ys) => xs.iter().zip(ys).map(|(x, y)| f(*x, *y)).collect(),
                None => vec![f64::NAN; xs.len()],
            };
            (entity.clone(), col)
        })
        .collect()
}

/// Elementwise map over a column set.
pub fn map_values<F>(cols: &EntityColumns, f: F) -> EntityColumns
where
    F: Fn(f64) -> f64,
{
    cols.iter()
        .map(|(entity, xs)| (entity.clone(), xs.iter().map(|v| f(*v)).collect()))
        .collect()
}

/// Cross-sectional percentile rank per date across the column set.
pub fn cs_rank_columns(cols: &EntityColumns) -> EntityColumns {
    let names: Vec<&String> = cols.keys().collect();
    let n = cols.values().next().map_or(0, Vec::len);
    let mut grid: Vec<Vec<f64>> = vec![vec![f64::NAN; n]; names.len()];
    for t in 0..n {
        let xs: Vec<f64> = names.iter().map(|e| cols[*e][t]).collect();
        let ranks = ops::cs_rank(&xs);
        for (row, rank) in grid.iter_mut().zip(&ranks) {
            row[t] = *rank;
        }
    }
    names
        .into_iter()
        .cloned()
        .zip(grid)
        .collect()
}

/// Wrap per-entity columns as a named factor series on the panel's axis.
pub fn series_from(name: &str, panel: &JoinedPanel, cols: EntityColumns) -> FactorSeries {
    FactorSeries::new(name, panel.dates().to_vec(), cols)
}
