//! Factor-value series — one factor's output over (date, entity).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A factor's values on a panel date axis, per entity. NaN marks undefined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: BTreeMap<String, Vec<f64>>,
}

/// One flat row of a factor series, the shape handed to sinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorRow {
    pub date: NaiveDate,
    pub entity: String,
    pub value: f64,
}

impl FactorSeries {
    pub fn new(name: &str, dates: Vec<NaiveDate>, values: BTreeMap<String, Vec<f64>>) -> Self {
        Self {
            name: name.to_string(),
            dates,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn n_entities(&self) -> usize {
        self.values.len()
    }

    /// One entity's values, aligned to `dates()`.
    pub fn values_for(&self, entity: &str) -> Option<&[f64]> {
        self.values.get(entity).map(Vec::as_slice)
    }

    /// True if every entity's vector matches the date axis length.
    pub fn is_rectangular(&self) -> bool {
        self.values.values().all(|v| v.len() == self.dates.len())
    }

    /// Flat (date, entity, value) rows in date-major, entity-minor order.
    pub fn rows(&self) -> Vec<FactorRow> {
        let mut out = Vec::with_capacity(self.dates.len() * self.values.len());
        for (t, date) in self.dates.iter().enumerate() {
            for (entity, vals) in &self.values {
                out.push(FactorRow {
                    date: *date,
                    entity: entity.clone(),
                    value: vals[t],
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> FactorSeries {
        let dates = vec![
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        ];
        let mut values = BTreeMap::new();
        values.insert("a".to_string(), vec![1.0, 2.0]);
        values.insert("b".to_string(), vec![f64::NAN, 4.0]);
        FactorSeries::new("demo", dates, values)
    }

    #[test]
    fn series_is_rectangular() {
        assert!(series().is_rectangular());
    }

    #[test]
    fn ragged_series_detected() {
        let mut s = series();
        s.values.insert("c".to_string(), vec![1.0]);
        assert!(!s.is_rectangular());
    }

    #[test]
    fn rows_are_date_major() {
        let rows = series().rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].entity, "a");
        assert_eq!(rows[1].entity, "b");
        assert_eq!(rows[0].date, rows[1].date);
        assert!(rows[1].value.is_nan());
        assert_eq!(rows[3].value, 4.0);
    }
}
