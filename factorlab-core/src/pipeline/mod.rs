//! Factor computation pipeline — registry resolution, dependency checks,
//! the raw ∪ derived join, factor invocation, and sink forwarding.
//!
//! Entity/date scoping happens upstream: callers restrict the raw panel
//! (`RawPanel::restrict`) and build features over the restricted panel, so
//! the frames handed in here are already aligned to the requested scope.

use thiserror::Error;

use crate::domain::{FactorSeries, JoinedPanel, RawPanel};
use crate::factors::registry::{FactorRegistry, RegistryError};
use crate::features::FeatureFrame;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Error raised by a sink; the pipeline propagates it uninterpreted.
#[derive(Debug, Error)]
#[error("sink error: {0}")]
pub struct SinkError(#[source] pub BoxedError);

/// Destination for computed factor series (persistence, plotting, tests).
pub trait FactorSink {
    fn write_factor(&mut self, series: &FactorSeries) -> Result<(), SinkError>;
}

/// In-memory sink for tests and ad-hoc inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub factors: Vec<FactorSeries>,
}

impl FactorSink for MemorySink {
    fn write_factor(&mut self, series: &FactorSeries) -> Result<(), SinkError> {
        self.factors.push(series.clone());
        Ok(())
    }
}

/// Fatal failures of one factor invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("factor '{factor}' requires field '{field}', absent from the joined panel")]
    MissingDependency { factor: String, field: String },
    #[error("factor '{factor}' returned a malformed series: {detail}")]
    ContractViolation { factor: String, detail: String },
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Compute one registered factor over the joined panel.
///
/// Fails fast on a missing required field before the factor runs; validates
/// the returned series shape against the panel grid.
pub fn compute_factor(
    registry: &FactorRegistry,
    name: &str,
    panel: &RawPanel,
    features: &FeatureFrame,
) -> Result<FactorSeries, PipelineError> {
    let factor = registry.get(name)?;
    let joined = JoinedPanel::build(panel, features);

    for field in factor.requires() {
        if !joined.has_field(field) {
            return Err(PipelineError::MissingDependency {
                factor: name.to_string(),
                field: (*field).to_string(),
            });
        }
    }

    let series = factor.compute(&joined);
    validate_shape(name, &joined, &series)?;
    Ok(series)
}

/// Compute one factor and forward the series to the sink.
pub fn compute_and_store(
    registry: &FactorRegistry,
    name: &str,
    panel: &RawPanel,
    features: &FeatureFrame,
    sink: &mut dyn FactorSink,
) -> Result<FactorSeries, PipelineError> {
    let series = compute_factor(registry, name, panel, features)?;
    sink.write_factor(&series)?;
    Ok(series)
}

/// A factor must return one value vector per panel entity, each on the
/// panel's date axis.
fn validate_shape(
    name: &str,
    joined: &JoinedPanel,
    series: &FactorSeries,
) -> Result<(), PipelineError> {
    let violation = |detail: String| PipelineError::ContractViolation {
        factor: name.to_string(),
        detail,
    };

    if series.dates() != joined.dates() {
        return Err(violation(format!(
            "date axis has {} points, panel has {}",
            series.dates().len(),
            joined.dates().len()
        )));
    }
    if series.n_entities() != joined.entities().len()
        || !joined
            .entities()
            .iter()
            .all(|e| series.values_for(e).is_some())
    {
        return Err(violation(format!(
            "entity set has {} members, panel has {}",
            series.n_entities(),
            joined.entities().len()
        )));
    }
    if !series.is_rectangular() {
        return Err(violation("ragged value vectors".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;
    use crate::factors::{install_builtin_factors, Factor};
    use crate::features::{build_features, FeatureConfig};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn obs(entity: &str, day: u32, close: f64) -> Observation {
        Observation {
            entity: entity.into(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
            amount: close * 1_000.0,
        }
    }

    fn setup(adv_windows: Vec<usize>) -> (FactorRegistry, RawPanel, FeatureFrame) {
        let mut registry = FactorRegistry::new();
        install_builtin_factors(&mut registry).unwrap();
        let panel = RawPanel::from_rows(vec![
            obs("a", 2, 10.0),
            obs("a", 3, 11.0),
            obs("a", 4, 12.0),
            obs("b", 2, 20.0),
            obs("b", 3, 19.0),
            obs("b", 4, 21.0),
        ]);
        let features = build_features(&panel, &FeatureConfig { adv_windows });
        (registry, panel, features)
    }

    #[test]
    fn compute_known_factor() {
        let (registry, panel, features) = setup(vec![5]);
        let series = compute_factor(&registry, "alpha101", &panel, &features).unwrap();
        assert_eq!(series.name(), "alpha101");
        assert_eq!(series.dates().len(), 3);
        assert_eq!(series.n_entities(), 2);
    }

    #[test]
    fn unknown_factor_surfaces_registry_error() {
        let (registry, panel, features) = setup(vec![]);
        match compute_factor(&registry, "alpha999", &panel, &features) {
            Err(PipelineError::Registry(RegistryError::UnknownFactor(name))) => {
                assert_eq!(name, "alpha999")
            }
            other => panic!("expected UnknownFactor, got {other:?}"),
        }
    }

    #[derive(Debug, Default)]
    struct NeedsAdv250;

    impl Factor for NeedsAdv250 {
        fn name(&self) -> &'static str {
            "needs_adv250"
        }
        fn requires(&self) -> &'static [&'static str] {
            &["close", "adv250"]
        }
        fn compute(&self, panel: &JoinedPanel) -> FactorSeries {
            FactorSeries::new("needs_adv250", panel.dates().to_vec(), BTreeMap::new())
        }
    }

    #[test]
    fn missing_dependency_fails_before_compute() {
        let (mut registry, panel, features) = setup(vec![5]);
        registry
            .register("needs_adv250", || Box::new(NeedsAdv250))
            .unwrap();
        match compute_factor(&registry, "needs_adv250", &panel, &features) {
            Err(PipelineError::MissingDependency { factor, field }) => {
                assert_eq!(factor, "needs_adv250");
                assert_eq!(field, "adv250");
            }
            other => panic!("expected MissingDependency, got {other:?}"),
        }
    }

    #[derive(Debug, Default)]
    struct WrongShape;

    impl Factor for WrongShape {
        fn name(&self) -> &'static str {
            "wrong_shape"
        }
        fn requires(&self) -> &'static [&'static str] {
            &["close"]
        }
        fn compute(&self, panel: &JoinedPanel) -> FactorSeries {
            // Drops the last axis date and every entity.
            let mut dates = panel.dates().to_vec();
            dates.pop();
            FactorSeries::new("wrong_shape", dates, BTreeMap::new())
        }
    }

    #[test]
    fn malformed_series_is_contract_violation() {
        let (mut registry, panel, features) = setup(vec![]);
        registry
            .register("wrong_shape", || Box::new(WrongShape))
            .unwrap();
        match compute_factor(&registry, "wrong_shape", &panel, &features) {
            Err(PipelineError::ContractViolation { factor, .. }) => {
                assert_eq!(factor, "wrong_shape")
            }
            other => panic!("expected ContractViolation, got {other:?}"),
        }
    }

    #[test]
    fn compute_and_store_forwards_to_sink() {
        let (registry, panel, features) = setup(vec![]);
        let mut sink = MemorySink::default();
        compute_and_store(&registry, "alpha101", &panel, &features, &mut sink).unwrap();
        assert_eq!(sink.factors.len(), 1);
        assert_eq!(sink.factors[0].name(), "alpha101");
    }

    #[test]
    fn entity_without_feature_coverage_is_joined_nan_filled() {
        let mut registry = FactorRegistry::new();
        install_builtin_factors(&mut registry).unwrap();
        let panel = RawPanel::from_rows(vec![
            obs("a", 2, 10.0),
            obs("a", 3, 11.0),
            obs("b", 2, 20.0),
            obs("b", 3, 19.0),
        ]);
        // Features only built for "a" — "b" still appears in the output.
        let sub = panel.restrict(Some(&["a".to_string()]), None, None);
        let features = build_features(&sub, &FeatureConfig::default());
        let series = compute_factor(&registry, "alpha041", &panel, &features).unwrap();
        assert_eq!(series.n_entities(), 2);
        assert!(series
            .values_for("b")
            .unwrap()
            .iter()
            .all(|v| v.is_nan()));
        assert!(!series.values_for("a").unwrap()[0].is_nan());
    }
}
