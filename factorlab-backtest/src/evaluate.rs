//! Evaluation — scores one factor series against forward returns.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use factorlab_core::domain::{FactorSeries, RawPanel};

use crate::forward::forward_returns;
use crate::ic::{cross_sections, daily_ic, entity_ts_ic, summarize};
use crate::quantile::portfolios;
use crate::report::{MetricsReport, SkipCounters};

/// Parameters of one evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Forward-return horizon in observed steps.
    pub horizon: usize,
    /// Requested quantile bucket count.
    pub quantiles: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            horizon: 1,
            quantiles: 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("horizon must be >= 1, got {0}")]
    InvalidHorizon(usize),
    #[error("quantiles must be >= 2, got {0}")]
    InvalidQuantiles(usize),
}

impl EvalConfig {
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.horizon < 1 {
            return Err(EvalError::InvalidHorizon(self.horizon));
        }
        if self.quantiles < 2 {
            return Err(EvalError::InvalidQuantiles(self.quantiles));
        }
        Ok(())
    }
}

/// Score a factor series against the raw price panel.
///
/// This is the barrier stage: every entity's values must already be in the
/// series (or absent as NaN) before the cross-sectional tables are built.
/// The per-entity time-series table is always produced alongside the
/// cross-sectional one — on sparse panels the latter may be empty while the
/// former still reads out, and the skip counters say why.
pub fn evaluate(
    factor: &FactorSeries,
    panel: &RawPanel,
    cfg: &EvalConfig,
) -> Result<MetricsReport, EvalError> {
    cfg.validate()?;

    let fwd = forward_returns(panel, cfg.horizon);
    let slices = cross_sections(factor, &fwd);

    let (daily, dates_skipped_coverage) = daily_ic(&slices);
    let summary = summarize(&daily);
    let entity_ts = entity_ts_ic(factor, &fwd);
    let (portfolio_tables, dates_skipped_buckets) = portfolios(&slices, cfg.quantiles);

    Ok(MetricsReport {
        factor: factor.name().to_string(),
        horizon: cfg.horizon,
        quantiles: cfg.quantiles,
        daily,
        summary,
        entity_ts,
        portfolios: portfolio_tables,
        skips: SkipCounters {
            dates_skipped_coverage,
            dates_skipped_buckets,
        },
    })
}
