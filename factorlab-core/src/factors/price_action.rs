//! Intraday price-geometry units: pure functions of the day's OHLC shape.

use crate::domain::{FactorSeries, JoinedPanel};

use super::registry::{FactorRegistry, RegistryError};
use super::{column_or_nan, series_from, Factor, EntityColumns};

pub fn register_factors(registry: &mut FactorRegistry) -> Result<(), RegistryError> {
    registry.register("alpha041", || Box::new(Alpha041))?;
    registry.register("alpha054", || Box::new(Alpha054))?;
    registry.register("alpha101", || Box::new(Alpha101))?;
    Ok(())
}

/// Geometric mid-price minus the volume-weighted average price.
#[derive(Debug, Default)]
pub struct Alpha041;

impl Factor for Alpha041 {
    fn name(&self) -> &'static str {
        "alpha041"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["high", "low", "vwap"]
    }

    fn compute(&self, panel: &JoinedPanel) -> FactorSeries {
        let mut cols = EntityColumns::new();
        for entity in panel.entities() {
            let high = column_or_nan(panel, "high", entity);
            let low = column_or_nan(panel, "low", entity);
            let vwap = column_or_nan(panel, "vwap", entity);
            let out: Vec<f64> = high
                .iter()
                .zip(low.iter().zip(&vwap))
                .map(|(h, (l, w))| (h * l).sqrt() - w)
                .collect();
            cols.insert(entity.clone(), out);
        }
        series_from(self.name(), panel, cols)
    }
}

/// Close-vs-low displacement scaled by fifth powers of open and close.
#[derive(Debug, Default)]
pub struct Alpha054;

impl Factor for Alpha054 {
    fn name(&self) -> &'static str {
        "alpha054"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["open", "high", "low", "close"]
    }

    fn compute(&self, panel: &JoinedPanel) -> FactorSeries {
        let mut cols = EntityColumns::new();
        for entity in panel.entities() {
            let open = column_or_nan(panel, "open", entity);
            let high = column_or_nan(panel, "high", entity);
            let low = column_or_nan(panel, "low", entity);
            let close = column_or_nan(panel, "close", entity);
            let out: Vec<f64> = (0..open.len())
                .map(|i| {
                    let num = -(low[i] - close[i]) * open[i].powi(5);
                    let den = (low[i] - high[i]) * close[i].powi(5);
                    num / den
                })
                .collect();
            cols.insert(entity.clone(), out);
        }
        series_from(self.name(), panel, cols)
    }
}

/// Daily candle body over its range: (close − open) / (high − low + 0.001).
#[derive(Debug, Default)]
pub struct Alpha101;

impl Factor for Alpha101 {
    fn name(&self) -> &'static str {
        "alpha101"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["open", "high", "low", "close"]
    }

    fn compute(&self, panel: &JoinedPanel) -> FactorSeries {
        let mut cols = EntityColumns::new();
        for entity in panel.entities() {
            let open = column_or_nan(panel, "open", entity);
            let high = column_or_nan(panel, "high", entity);
            let low = column_or_nan(panel, "low", entity);
            let close = column_or_nan(panel, "close", entity);
            let out: Vec<f64> = (0..open.len())
                .map(|i| (close[i] - open[i]) / (high[i] - low[i] + 0.001))
                .collect();
            cols.insert(entity.clone(), out);
        }
        series_from(self.name(), panel, cols)
    }
}
