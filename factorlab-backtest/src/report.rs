//! Metrics report — the immutable result of one factor evaluation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One date's cross-sectional correlation row. Only dates with at least two
/// covered entities appear; `ic`/`rank_ic` may still be NaN when the
/// cross-section has zero dispersion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyIc {
    pub date: NaiveDate,
    pub n_entities: usize,
    pub ic: f64,
    pub rank_ic: f64,
}

/// Aggregates of the daily IC/RankIC series (NaN entries excluded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcSummary {
    pub mean_ic: f64,
    pub std_ic: f64,
    pub t_stat: f64,
    pub mean_rank_ic: f64,
    pub std_rank_ic: f64,
    pub rank_ic_t_stat: f64,
    pub n_days: usize,
}

/// Per-entity correlation of the factor with its own forward returns across
/// time — the readable metric when cross-sectional coverage is chronically
/// thin (for example single-entity runs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityTsIc {
    pub entity: String,
    pub ts_ic: f64,
    pub ts_rank_ic: f64,
    pub n_obs: usize,
}

/// One quantile bucket's equal-weighted forward return on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketReturn {
    pub date: NaiveDate,
    pub bucket_id: usize,
    pub bucket_return: f64,
}

/// Top-bucket minus bottom-bucket return on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongShortReturn {
    pub date: NaiveDate,
    pub long_short_return: f64,
}

/// Compounded growth of 1 for a bucket, up to and including `date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketCumulative {
    pub date: NaiveDate,
    pub bucket_id: usize,
    pub cum_return: f64,
}

/// Compounded growth of 1 for the long-short series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongShortCumulative {
    pub date: NaiveDate,
    pub cum_return: f64,
}

/// Quantile-portfolio outputs: daily tables and their cumulative series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioTables {
    pub bucket_returns: Vec<BucketReturn>,
    pub long_short: Vec<LongShortReturn>,
    pub bucket_cumulative: Vec<BucketCumulative>,
    pub long_short_cumulative: Vec<LongShortCumulative>,
}

/// Sparse-data skip metadata. Skips are not errors: the affected dates are
/// omitted from the relevant tables and counted here.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SkipCounters {
    /// Dates with some coverage but fewer than 2 covered entities.
    pub dates_skipped_coverage: usize,
    /// Dates whose effective quantile bucket count collapsed below 2.
    pub dates_skipped_buckets: usize,
}

/// Everything one (factor, horizon, quantile-count) evaluation produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub factor: String,
    pub horizon: usize,
    pub quantiles: usize,
    pub daily: Vec<DailyIc>,
    pub summary: IcSummary,
    pub entity_ts: Vec<EntityTsIc>,
    pub portfolios: PortfolioTables,
    pub skips: SkipCounters,
}
