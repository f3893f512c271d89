//! Observation — the fundamental raw panel unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV + turnover observation for a single entity.
///
/// `amount` is the traded notional for the day; `vwap` is derived from it
/// downstream as amount / volume. All numeric fields are f64 so that a
/// missing cell can be represented as NaN after panel alignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub entity: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub amount: f64,
}

impl Observation {
    /// Void observation for a date on which the entity has no row.
    ///
    /// Produced by panel alignment; every numeric field is NaN so the
    /// operator library's NaN propagation handles the gap.
    pub fn void(entity: &str, date: NaiveDate) -> Self {
        Self {
            entity: entity.to_string(),
            date,
            open: f64::NAN,
            high: f64::NAN,
            low: f64::NAN,
            close: f64::NAN,
            volume: f64::NAN,
            amount: f64::NAN,
        }
    }

    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high is the top of the range, prices positive.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }
}
