//! Cross-sectional and per-entity time-series information coefficients.

use std::collections::HashMap;

use chrono::NaiveDate;
use factorlab_core::domain::FactorSeries;
use factorlab_core::ops::average_ranks;
use rayon::prelude::*;

use crate::forward::ForwardReturns;
use crate::report::{DailyIc, EntityTsIc, IcSummary};
use crate::stats::{mean, pairwise_complete, pearson, sample_std, spearman, t_stat};

/// One date's covered cross-section: entities with both a factor value and
/// a forward return, in a fixed entity order.
#[derive(Debug, Clone)]
pub(crate) struct DateSlice {
    pub date: NaiveDate,
    pub factor: Vec<f64>,
    pub fwd: Vec<f64>,
}

impl DateSlice {
    pub fn n(&self) -> usize {
        self.factor.len()
    }
}

/// Pairs of aligned axis indices (factor side, forward side) for the dates
/// both series share.
pub(crate) fn shared_axis(factor: &FactorSeries, fwd: &ForwardReturns) -> Vec<(usize, usize)> {
    let fwd_index: HashMap<NaiveDate, usize> = fwd
        .dates()
        .iter()
        .enumerate()
        .map(|(i, d)| (*d, i))
        .collect();
    factor
        .dates()
        .iter()
        .enumerate()
        .filter_map(|(fi, d)| fwd_index.get(d).map(|pi| (fi, *pi)))
        .collect()
}

/// Gather the covered cross-section of every shared date. Dates with no
/// covered entity at all produce no slice.
pub(crate) fn cross_sections(factor: &FactorSeries, fwd: &ForwardReturns) -> Vec<DateSlice> {
    let axis = shared_axis(factor, fwd);
    let entities: Vec<&str> = factor
        .entities()
        .filter(|e| fwd.values_for(e).is_some())
        .collect();

    let mut slices = Vec::new();
    for (fi, pi) in axis {
        let mut fac = Vec::new();
        let mut ret = Vec::new();
        for entity in &entities {
            let f = factor.values_for(entity).map_or(f64::NAN, |v| v[fi]);
            let r = fwd.values_for(entity).map_or(f64::NAN, |v| v[pi]);
            if !f.is_nan() && !r.is_nan() {
                fac.push(f);
                ret.push(r);
            }
        }
        if !fac.is_empty() {
            slices.push(DateSlice {
                date: factor.dates()[fi],
                factor: fac,
                fwd: ret,
            });
        }
    }
    slices
}

/// Daily IC/RankIC rows plus the count of dates skipped for coverage.
///
/// A date with fewer than 2 covered entities is omitted from the series —
/// not zero-filled — and counted as skipped.
pub(crate) fn daily_ic(slices: &[DateSlice]) -> (Vec<DailyIc>, usize) {
    let mut rows = Vec::new();
    let mut skipped = 0;
    for slice in slices {
        if slice.n() < 2 {
            skipped += 1;
            continue;
        }
        let ranks_f = average_ranks(&slice.factor);
        let ranks_r = average_ranks(&slice.fwd);
        rows.push(DailyIc {
            date: slice.date,
            n_entities: slice.n(),
            ic: pearson(&slice.factor, &slice.fwd),
            rank_ic: pearson(&ranks_f, &ranks_r),
        });
    }
    (rows, skipped)
}

/// Mean/std/t of the daily IC and RankIC series, NaN entries excluded.
pub fn summarize(daily: &[DailyIc]) -> IcSummary {
    let ic: Vec<f64> = daily.iter().map(|r| r.ic).filter(|v| !v.is_nan()).collect();
    let rank_ic: Vec<f64> = daily
        .iter()
        .map(|r| r.rank_ic)
        .filter(|v| !v.is_nan())
        .collect();
    IcSummary {
        mean_ic: mean(&ic),
        std_ic: sample_std(&ic),
        t_stat: t_stat(&ic),
        mean_rank_ic: mean(&rank_ic),
        std_rank_ic: sample_std(&rank_ic),
        rank_ic_t_stat: t_stat(&rank_ic),
        n_days: daily.len(),
    }
}

/// Per-entity correlations of factor vs forward return across time.
///
/// Entities are independent, so the scan fans out across a worker pool.
/// Rows with fewer than 2 overlapping points report NaN correlations but
/// keep their observation count.
pub fn entity_ts_ic(factor: &FactorSeries, fwd: &ForwardReturns) -> Vec<EntityTsIc> {
    let axis = shared_axis(factor, fwd);
    let entities: Vec<&str> = factor
        .entities()
        .filter(|e| fwd.values_for(e).is_some())
        .collect();

    entities
        .par_iter()
        .map(|entity| {
            let fac: Vec<f64> = axis
                .iter()
                .map(|(fi, _)| factor.values_for(entity).map_or(f64::NAN, |v| v[*fi]))
                .collect();
            let ret: Vec<f64> = axis
                .iter()
                .map(|(_, pi)| fwd.values_for(entity).map_or(f64::NAN, |v| v[*pi]))
                .collect();
            let (f, r) = pairwise_complete(&fac, &ret);
            let (ts_ic, ts_rank_ic) = if f.len() >= 2 {
                (pearson(&f, &r), spearman(&f, &r))
            } else {
                (f64::NAN, f64::NAN)
            };
            EntityTsIc {
                entity: entity.to_string(),
                ts_ic,
                ts_rank_ic,
                n_obs: f.len(),
            }
        })
        .collect()
}
