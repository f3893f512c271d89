//! Quantile portfolios — bucketed forward returns and the long-short spread.

use std::collections::BTreeMap;

use factorlab_core::ops::average_ranks;

use crate::ic::DateSlice;
use crate::report::{
    BucketCumulative, BucketReturn, LongShortCumulative, LongShortReturn, PortfolioTables,
};
use crate::stats::mean;

/// Build the portfolio tables from the covered cross-sections.
///
/// Per date: k = min(quantiles, n) buckets cut on tie-averaged ranks, so
/// tied factor values share a bucket and collapsed cut-points shrink the
/// effective bucket count. The precondition "effective buckets ≥ 2" is
/// checked before any portfolio is formed; dates failing it are counted and
/// omitted, never an error. Bucket ids ascend with factor value, so the
/// long-short spread is top id minus bottom id.
///
/// Returns the tables plus the count of skipped dates.
pub(crate) fn portfolios(slices: &[DateSlice], quantiles: usize) -> (PortfolioTables, usize) {
    let mut tables = PortfolioTables::default();
    let mut skipped = 0;

    for slice in slices {
        let n = slice.n();
        if n < 2 {
            continue; // already outside the cross-sectional set
        }
        let k = quantiles.min(n);
        let ranks = average_ranks(&slice.factor);
        let buckets: Vec<usize> = ranks
            .iter()
            .map(|r| ((r * k as f64 / n as f64).ceil() as usize).clamp(1, k))
            .collect();

        let mut members: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        for (bucket, ret) in buckets.iter().zip(&slice.fwd) {
            members.entry(*bucket).or_default().push(*ret);
        }

        if members.len() < 2 {
            skipped += 1;
            continue;
        }

        let returns: BTreeMap<usize, f64> = members
            .iter()
            .map(|(id, rets)| (*id, mean(rets)))
            .collect();
        for (id, ret) in &returns {
            tables.bucket_returns.push(BucketReturn {
                date: slice.date,
                bucket_id: *id,
                bucket_return: *ret,
            });
        }

        // BTreeMap keys ascend, so first/last are the extreme buckets.
        let bottom = returns.values().next().copied().unwrap_or(f64::NAN);
        let top = returns.values().next_back().copied().unwrap_or(f64::NAN);
        tables.long_short.push(LongShortReturn {
            date: slice.date,
            long_short_return: top - bottom,
        });
    }

    compound(&mut tables);
    (tables, skipped)
}

/// Fill in the cumulative series: per bucket id and for long-short, the
/// exact running product of (1 + daily return) in chronological order,
/// reset only at the start of the window. A bucket with no members on a
/// date contributes no compounding term that date.
fn compound(tables: &mut PortfolioTables) {
    let mut acc: BTreeMap<usize, f64> = BTreeMap::new();
    for row in &tables.bucket_returns {
        let c = acc.entry(row.bucket_id).or_insert(1.0);
        *c *= 1.0 + row.bucket_return;
        tables.bucket_cumulative.push(BucketCumulative {
            date: row.date,
            bucket_id: row.bucket_id,
            cum_return: *c,
        });
    }

    let mut ls = 1.0;
    for row in &tables.long_short {
        ls *= 1.0 + row.long_short_return;
        tables.long_short_cumulative.push(LongShortCumulative {
            date: row.date,
            cum_return: ls,
        });
    }
}
