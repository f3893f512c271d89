//! Feature builder — cached per-entity derived series.
//!
//! Derives `returns`, `vwap`, and rolling average volume (`adv{N}`) from one
//! entity's raw observations, each field independently via the operator
//! library. Entities are independent, so callers may fan the builder out
//! across entities without synchronization; the result is cached in a
//! `FeatureFrame` and only rebuilt when the raw panel changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Observation, RawPanel};
use crate::ops::rolling_mean;

/// Average-volume windows built by default.
pub const DEFAULT_ADV_WINDOWS: [usize; 5] = [5, 10, 20, 30, 60];

/// Which derived fields to build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureConfig {
    /// Rolling windows for average volume, one `adv{N}` column per entry.
    pub adv_windows: Vec<usize>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            adv_windows: DEFAULT_ADV_WINDOWS.to_vec(),
        }
    }
}

/// Derived series for one entity, aligned to the panel date axis.
#[derive(Debug, Clone)]
pub struct EntityFeatures {
    pub returns: Vec<f64>,
    pub vwap: Vec<f64>,
    pub adv: BTreeMap<usize, Vec<f64>>,
}

impl EntityFeatures {
    /// Look up a derived column by field name (`returns`, `vwap`, `adv{N}`).
    pub fn column(&self, field: &str) -> Option<&[f64]> {
        match field {
            "returns" => Some(&self.returns),
            "vwap" => Some(&self.vwap),
            _ => {
                let window: usize = field.strip_prefix("adv")?.parse().ok()?;
                self.adv.get(&window).map(Vec::as_slice)
            }
        }
    }
}

/// Derived features for many entities.
pub type FeatureFrame = BTreeMap<String, EntityFeatures>;

/// Build all derived fields for one entity's aligned observations.
///
/// Each field is computed independently; a degenerate window (0 or longer
/// than the series) fills that field with NaN instead of aborting the run.
pub fn build_entity_features(obs: &[Observation], cfg: &FeatureConfig) -> EntityFeatures {
    let close: Vec<f64> = obs.iter().map(|o| o.close).collect();
    let volume: Vec<f64> = obs.iter().map(|o| o.volume).collect();
    let amount: Vec<f64> = obs.iter().map(|o| o.amount).collect();

    let adv = cfg
        .adv_windows
        .iter()
        .map(|&w| (w, rolling_mean(&volume, w)))
        .collect();

    EntityFeatures {
        returns: pct_change(&close),
        vwap: vwap_from_amount(&amount, &volume),
        adv,
    }
}

/// Build features for every entity in the panel, serially.
///
/// Per-entity parallel fan-out lives with the orchestration layer; this is
/// the reference single-threaded path.
pub fn build_features(panel: &RawPanel, cfg: &FeatureConfig) -> FeatureFrame {
    panel
        .entities()
        .filter_map(|e| {
            let rows = panel.entity_rows(e)?;
            Some((e.to_string(), build_entity_features(rows, cfg)))
        })
        .collect()
}

/// Close-to-close percentage change; first point NaN.
///
/// A NaN or non-positive previous close makes the point undefined rather
/// than infinite.
fn pct_change(close: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; close.len()];
    for i in 1..close.len() {
        let prev = close[i - 1];
        if prev > 0.0 {
            out[i] = close[i] / prev - 1.0;
        }
    }
    out
}

/// Volume-weighted average price: amount / volume, zero volume → NaN.
fn vwap_from_amount(amount: &[f64], volume: &[f64]) -> Vec<f64> {
    amount
        .iter()
        .zip(volume)
        .map(|(a, v)| if *v == 0.0 { f64::NAN } else { a / v })
        .collect()
}
