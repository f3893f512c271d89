//! Panel input — CSV loading and a deterministic synthetic fallback.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;

use factorlab_core::domain::{Observation, RawPanel};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("duplicate (date, entity) row: {entity} {date}")]
    DuplicateRow { entity: String, date: NaiveDate },
    #[error("panel file has no rows: {0}")]
    Empty(String),
}

/// CSV schema: `entity,date,open,high,low,close,volume,amount`.
#[derive(Debug, Deserialize)]
struct PanelRow {
    entity: String,
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    amount: f64,
}

/// Load a raw panel from CSV.
///
/// Duplicate (date, entity) pairs violate the panel key invariant and are
/// rejected; out-of-order rows are fine — alignment sorts the axis.
pub fn load_panel_csv(path: &Path) -> Result<RawPanel, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    let mut seen: HashSet<(String, NaiveDate)> = HashSet::new();

    for record in reader.deserialize::<PanelRow>() {
        let row = record?;
        if !seen.insert((row.entity.clone(), row.date)) {
            return Err(LoadError::DuplicateRow {
                entity: row.entity,
                date: row.date,
            });
        }
        rows.push(Observation {
            entity: row.entity,
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            amount: row.amount,
        });
    }

    if rows.is_empty() {
        return Err(LoadError::Empty(path.display().to_string()));
    }
    Ok(RawPanel::from_rows(rows))
}

/// Generate a deterministic random-walk panel for demos and tests.
///
/// Same (entities, days, seed) → identical panel, bit for bit.
pub fn synthetic_panel(n_entities: usize, n_days: usize, seed: u64) -> RawPanel {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).expect("fixed calendar date");
    let mut rows = Vec::with_capacity(n_entities * n_days);

    for e in 0..n_entities {
        let entity = format!("syn{e:03}");
        let mut close = 20.0 + 5.0 * e as f64;
        for d in 0..n_days {
            let date = start + chrono::Duration::days(d as i64);
            let ret = (rng.gen::<f64>() - 0.5) * 0.04;
            let open = close;
            close = (close * (1.0 + ret)).max(0.5);
            let high = open.max(close) * (1.0 + rng.gen::<f64>() * 0.01);
            let low = open.min(close) * (1.0 - rng.gen::<f64>() * 0.01);
            let volume = rng.gen_range(50_000.0f64..150_000.0).round();
            let amount = (open + close) / 2.0 * volume;
            rows.push(Observation {
                entity: entity.clone(),
                date,
                open,
                high,
                low,
                close,
                volume,
                amount,
            });
        }
    }

    RawPanel::from_rows(rows)
}
