//! Momentum and reversal units built on close/returns history.

use crate::domain::{FactorSeries, JoinedPanel};
use crate::ops;

use super::registry::{FactorRegistry, RegistryError};
use super::{
    column_or_nan, cs_rank_columns, map_values, per_entity, series_from, zip_with, Factor,
    EntityColumns,
};

pub fn register_factors(registry: &mut FactorRegistry) -> Result<(), RegistryError> {
    registry.register("alpha001", || Box::new(Alpha001))?;
    registry.register("alpha009", || Box::new(Alpha009))?;
    registry.register("alpha012", || Box::new(Alpha012))?;
    Ok(())
}

/// Centered cross-sectional rank of the 5-day time-series rank of a squared
/// shock proxy: downside days use the 20-day return std, upside days the
/// close itself.
#[derive(Debug, Default)]
pub struct Alpha001;

impl Factor for Alpha001 {
    fn name(&self) -> &'static str {
        "alpha001"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["returns", "close"]
    }

    fn compute(&self, panel: &JoinedPanel) -> FactorSeries {
        let mut cols = EntityColumns::new();
        for entity in panel.entities() {
            let ret = column_or_nan(panel, "returns", entity);
            let close = column_or_nan(panel, "close", entity);
            let std20 = ops::rolling_std(&ret, 20);
            let proxy: Vec<f64> = ret
                .iter()
                .zip(close.iter().zip(&std20))
                .map(|(r, (c, s))| {
                    let base = if *r < 0.0 { *s } else { *c };
                    base * base
                })
                .collect();
            cols.insert(entity.clone(), ops::ts_rank(&proxy, 5));
        }
        let ranked = map_values(&cs_rank_columns(&cols), |v| v - 0.5);
        series_from(self.name(), panel, ranked)
    }
}

/// Follow the 1-day close change while its trailing 5-day range stays
/// one-sided, fade it otherwise.
#[derive(Debug, Default)]
pub struct Alpha009;

impl Factor for Alpha009 {
    fn name(&self) -> &'static str {
        "alpha009"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["close"]
    }

    fn compute(&self, panel: &JoinedPanel) -> FactorSeries {
        let mut cols = EntityColumns::new();
        for entity in panel.entities() {
            let close = column_or_nan(panel, "close", entity);
            let dc = ops::delta(&close, 1);
            let lo = ops::rolling_min(&dc, 5);
            let hi = ops::rolling_max(&dc, 5);
            let out: Vec<f64> = dc
                .iter()
                .zip(lo.iter().zip(&hi))
                .map(|(d, (l, h))| {
                    if *l > 0.0 || *h < 0.0 {
                        *d
                    } else {
                        -*d
                    }
                })
                .collect();
            cols.insert(entity.clone(), out);
        }
        series_from(self.name(), panel, cols)
    }
}

/// Contrarian close move gated by the direction of the volume change:
/// sign(Δvolume) · (−Δclose).
#[derive(Debug, Default)]
pub struct Alpha012;

impl Factor for Alpha012 {
    fn name(&self) -> &'static str {
        "alpha012"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["close", "volume"]
    }

    fn compute(&self, panel: &JoinedPanel) -> FactorSeries {
        let dc = per_entity(panel, "close", |s| ops::delta(s, 1));
        let dv = per_entity(panel, "volume", |s| ops::delta(s, 1));
        let out = zip_with(&dv, &dc, |v, c| ops::sign(v) * -c);
        series_from(self.name(), panel, out)
    }
}
