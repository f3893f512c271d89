//! Run orchestration — wires loading, feature building, the pipeline, and
//! evaluation together.

use chrono::NaiveDate;
use rayon::prelude::*;
use thiserror::Error;

use factorlab_core::domain::{FactorSeries, RawPanel};
use factorlab_core::factors::FactorRegistry;
use factorlab_core::features::{build_entity_features, FeatureConfig, FeatureFrame};
use factorlab_core::pipeline::{compute_factor, PipelineError};

use crate::config::{ConfigError, RunConfig};
use crate::data_loader::{load_panel_csv, synthetic_panel, LoadError};
use crate::evaluate::{evaluate, EvalConfig, EvalError};
use crate::report::MetricsReport;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("date '{0}' is not in YYYY-MM-DD form")]
    BadDate(String),
    #[error("panel is empty after applying the requested scope")]
    EmptyScope,
}

/// Result of one end-to-end factor backtest.
#[derive(Debug, Clone)]
pub struct FactorBacktest {
    pub series: FactorSeries,
    pub report: MetricsReport,
}

/// Build derived features for every entity, fanned out across a worker pool.
///
/// Entities are pure, independent inputs, so no synchronization is needed;
/// the collect is the barrier before any cross-sectional stage runs.
pub fn build_feature_frame(panel: &RawPanel, cfg: &FeatureConfig) -> FeatureFrame {
    let entities: Vec<&str> = panel.entities().collect();
    entities
        .par_iter()
        .filter_map(|entity| {
            panel
                .entity_rows(entity)
                .map(|rows| (entity.to_string(), build_entity_features(rows, cfg)))
        })
        .collect()
}

/// Run one factor over a pre-loaded panel and score it.
pub fn run_factor_backtest(
    registry: &FactorRegistry,
    panel: &RawPanel,
    features_cfg: &FeatureConfig,
    factor: &str,
    eval_cfg: &EvalConfig,
) -> Result<FactorBacktest, RunError> {
    let features = build_feature_frame(panel, features_cfg);
    let series = compute_factor(registry, factor, panel, &features)?;
    let report = evaluate(&series, panel, eval_cfg)?;
    Ok(FactorBacktest { series, report })
}

/// Run from a TOML config: load or synthesize the panel, apply the scope,
/// then compute and evaluate.
pub fn run_from_config(
    registry: &FactorRegistry,
    config: &RunConfig,
) -> Result<FactorBacktest, RunError> {
    config.validate()?;

    let panel = if config.data.synthetic {
        synthetic_panel(
            config.data.synthetic_entities,
            config.data.synthetic_days,
            config.data.seed,
        )
    } else {
        let path = config.data.path.as_deref().ok_or_else(|| {
            ConfigError::Invalid("data.path required when synthetic = false".into())
        })?;
        load_panel_csv(path)?
    };

    let start = parse_date(config.backtest.start.as_deref())?;
    let end = parse_date(config.backtest.end.as_deref())?;
    let scoped = panel.restrict(config.backtest.entities.as_deref(), start, end);
    if scoped.is_empty() {
        return Err(RunError::EmptyScope);
    }

    run_factor_backtest(
        registry,
        &scoped,
        &config.features,
        &config.backtest.factor,
        &config.eval_config(),
    )
}

fn parse_date(text: Option<&str>) -> Result<Option<NaiveDate>, RunError> {
    match text {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| RunError::BadDate(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::synthetic_panel;
    use factorlab_core::factors::install_builtin_factors;
    use factorlab_core::features::build_features;

    fn registry() -> FactorRegistry {
        let mut reg = FactorRegistry::new();
        install_builtin_factors(&mut reg).unwrap();
        reg
    }

    /// NaN-aware element equality (NaN lead-ins compare equal).
    fn same_series(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len()
            && a.iter()
                .zip(b)
                .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
    }

    #[test]
    fn parallel_feature_frame_matches_serial() {
        let panel = synthetic_panel(4, 40, 3);
        let cfg = FeatureConfig::default();
        let parallel = build_feature_frame(&panel, &cfg);
        let serial = build_features(&panel, &cfg);
        assert_eq!(parallel.len(), serial.len());
        for (entity, features) in &serial {
            let p = &parallel[entity];
            assert!(same_series(&p.returns, &features.returns));
            assert!(same_series(&p.vwap, &features.vwap));
            for (w, col) in &features.adv {
                assert!(same_series(&p.adv[w], col));
            }
        }
    }

    #[test]
    fn end_to_end_synthetic_run() {
        let reg = registry();
        let panel = synthetic_panel(5, 60, 11);
        let result = run_factor_backtest(
            &reg,
            &panel,
            &FeatureConfig::default(),
            "alpha101",
            &EvalConfig::default(),
        )
        .unwrap();
        assert_eq!(result.series.n_entities(), 5);
        assert_eq!(result.report.factor, "alpha101");
        // 5 entities, complete coverage: 59 scored dates, none skipped.
        assert_eq!(result.report.daily.len(), 59);
        assert_eq!(result.report.skips.dates_skipped_coverage, 0);
        assert_eq!(result.report.entity_ts.len(), 5);
    }

    #[test]
    fn run_from_synthetic_config() {
        let reg = registry();
        let config = RunConfig::from_toml(
            r#"
[data]
synthetic = true
synthetic_entities = 3
synthetic_days = 30
seed = 5

[backtest]
factor = "alpha012"
horizon = 2
quantiles = 3
"#,
        )
        .unwrap();
        let result = run_from_config(&reg, &config).unwrap();
        assert_eq!(result.report.horizon, 2);
        assert_eq!(result.report.quantiles, 3);
        assert!(!result.report.daily.is_empty());
    }

    #[test]
    fn empty_scope_is_an_error() {
        let reg = registry();
        let config = RunConfig::from_toml(
            r#"
[data]
synthetic = true

[backtest]
factor = "alpha101"
entities = ["not_present"]
"#,
        )
        .unwrap();
        assert!(matches!(
            run_from_config(&reg, &config),
            Err(RunError::EmptyScope)
        ));
    }

    #[test]
    fn bad_date_is_an_error() {
        let reg = registry();
        let config = RunConfig::from_toml(
            r#"
[data]
synthetic = true

[backtest]
factor = "alpha101"
start = "01/02/2024"
"#,
        )
        .unwrap();
        assert!(matches!(
            run_from_config(&reg, &config),
            Err(RunError::BadDate(_))
        ));
    }
}
