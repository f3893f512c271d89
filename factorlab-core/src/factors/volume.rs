//! Price–volume interaction units.

use crate::domain::{FactorSeries, JoinedPanel};
use crate::ops;

use super::registry::{FactorRegistry, RegistryError};
use super::{
    column_or_nan, columns, cs_rank_columns, map_values, series_from, Factor, EntityColumns,
};

pub fn register_factors(registry: &mut FactorRegistry) -> Result<(), RegistryError> {
    registry.register("alpha006", || Box::new(Alpha006))?;
    registry.register("alpha013", || Box::new(Alpha013))?;
    Ok(())
}

/// Negated 10-day correlation of open price and volume.
#[derive(Debug, Default)]
pub struct Alpha006;

impl Factor for Alpha006 {
    fn name(&self) -> &'static str {
        "alpha006"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["open", "volume"]
    }

    fn compute(&self, panel: &JoinedPanel) -> FactorSeries {
        let mut cols = EntityColumns::new();
        for entity in panel.entities() {
            let open = column_or_nan(panel, "open", entity);
            let volume = column_or_nan(panel, "volume", entity);
            let corr = ops::rolling_corr(&open, &volume, 10);
            cols.insert(entity.clone(), corr.into_iter().map(|v| -v).collect());
        }
        series_from(self.name(), panel, cols)
    }
}

/// Negated cross-sectional rank of the 5-day covariance between the
/// within-date ranks of close and volume.
#[derive(Debug, Default)]
pub struct Alpha013;

impl Factor for Alpha013 {
    fn name(&self) -> &'static str {
        "alpha013"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["close", "volume"]
    }

    fn compute(&self, panel: &JoinedPanel) -> FactorSeries {
        let close_ranks = cs_rank_columns(&columns(panel, "close"));
        let volume_ranks = cs_rank_columns(&columns(panel, "volume"));

        let mut cov_cols = EntityColumns::new();
        for entity in panel.entities() {
            let n = panel.dates().len();
            let nan = vec![f64::NAN; n];
            let x = close_ranks.get(entity).map(Vec::as_slice).unwrap_or(&nan);
            let y = volume_ranks.get(entity).map(Vec::as_slice).unwrap_or(&nan);
            cov_cols.insert(entity.clone(), ops::rolling_cov(x, y, 5));
        }

        let out = map_values(&cs_rank_columns(&cov_cols), |v| -v);
        series_from(self.name(), panel, out)
    }
}
