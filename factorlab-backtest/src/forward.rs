//! Forward returns — the prediction target the metrics score against.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use factorlab_core::domain::RawPanel;

/// Per-entity forward returns on the panel's date axis.
///
/// `values[e][t]` is the return realized over (t, t+h], labeled at t —
/// the return attributed to a signal observed at t.
#[derive(Debug, Clone)]
pub struct ForwardReturns {
    dates: Vec<NaiveDate>,
    values: BTreeMap<String, Vec<f64>>,
}

impl ForwardReturns {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values_for(&self, entity: &str) -> Option<&[f64]> {
        self.values.get(entity).map(Vec::as_slice)
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Compute h-step forward returns per entity.
///
/// Steps are counted in the entity's own observed closes, skipping void
/// cells, so alignment gaps do not silently shorten the horizon. The last h
/// observations of each entity are undefined, as is any point whose close
/// is NaN or non-positive.
pub fn forward_returns(panel: &RawPanel, horizon: usize) -> ForwardReturns {
    let n = panel.dates().len();
    let mut values = BTreeMap::new();

    for entity in panel.entities() {
        let closes = panel
            .raw_column(entity, "close")
            .unwrap_or_else(|| vec![f64::NAN; n]);
        let mut out = vec![f64::NAN; n];

        // Indices of usable closes, in time order.
        let observed: Vec<usize> = (0..n).filter(|&i| closes[i] > 0.0).collect();
        if observed.len() > horizon {
            for k in 0..observed.len() - horizon {
                let here = observed[k];
                let ahead = observed[k + horizon];
                out[here] = closes[ahead] / closes[here] - 1.0;
            }
        }
        values.insert(entity.to_string(), out);
    }

    ForwardReturns {
        dates: panel.dates().to_vec(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factorlab_core::domain::Observation;

    fn obs(entity: &str, day: u32, close: f64) -> Observation {
        Observation {
            entity: entity.into(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
            amount: close * 1_000.0,
        }
    }

    #[test]
    fn one_step_forward_return() {
        let panel = RawPanel::from_rows(vec![
            obs("a", 2, 100.0),
            obs("a", 3, 110.0),
            obs("a", 4, 99.0),
        ]);
        let fwd = forward_returns(&panel, 1);
        let vals = fwd.values_for("a").unwrap();
        assert!((vals[0] - 0.1).abs() < 1e-12);
        assert!((vals[1] - (99.0 / 110.0 - 1.0)).abs() < 1e-12);
        assert!(vals[2].is_nan()); // last horizon dates undefined
    }

    #[test]
    fn horizon_longer_than_series_all_nan() {
        let panel = RawPanel::from_rows(vec![obs("a", 2, 100.0), obs("a", 3, 110.0)]);
        let fwd = forward_returns(&panel, 5);
        assert!(fwd.values_for("a").unwrap().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn gap_dates_skip_but_keep_horizon_in_observations() {
        // "a" trades on days 2, 3, 5; "b" pads the axis with day 4.
        let panel = RawPanel::from_rows(vec![
            obs("a", 2, 100.0),
            obs("a", 3, 105.0),
            obs("a", 5, 126.0),
            obs("b", 4, 50.0),
        ]);
        let fwd = forward_returns(&panel, 1);
        let vals = fwd.values_for("a").unwrap();
        // Day 3's next observed close is day 5 (axis slot 3).
        assert!((vals[1] - 0.2).abs() < 1e-12);
        // The void slot (day 4) stays undefined.
        assert!(vals[2].is_nan());
        assert!(vals[3].is_nan());
    }

    #[test]
    fn two_step_horizon() {
        let panel = RawPanel::from_rows(vec![
            obs("a", 2, 100.0),
            obs("a", 3, 105.0),
            obs("a", 4, 121.0),
            obs("a", 5, 90.0),
        ]);
        let fwd = forward_returns(&panel, 2);
        let vals = fwd.values_for("a").unwrap();
        assert!((vals[0] - 0.21).abs() < 1e-12);
        assert!((vals[1] - (90.0 / 105.0 - 1.0)).abs() < 1e-12);
        assert!(vals[2].is_nan());
        assert!(vals[3].is_nan());
    }
}
