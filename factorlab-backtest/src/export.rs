//! CSV artifact export — the on-disk sink implementation.
//!
//! One directory per run; each table of the metrics report lands in its own
//! `<factor>_*.csv` file, the factor series itself in `<factor>.csv`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use factorlab_core::domain::FactorSeries;
use factorlab_core::pipeline::{FactorSink, SinkError};

use crate::report::MetricsReport;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes factor series and metrics reports as CSVs under one directory.
#[derive(Debug)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    /// Create the sink, making the output directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_table<T: Serialize>(&self, file: &str, rows: &[T]) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_path(self.dir.join(file))?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the factor series as `<name>.csv` with date,entity,value rows.
    pub fn write_series(&self, series: &FactorSeries) -> Result<PathBuf, ExportError> {
        let path = self.dir.join(format!("{}.csv", series.name()));
        let mut writer = csv::Writer::from_path(&path)?;
        for row in series.rows() {
            writer.serialize(&row)?;
        }
        writer.flush()?;
        Ok(path)
    }

    /// Write every table of the report, named after its factor.
    pub fn write_report(&self, report: &MetricsReport) -> Result<(), ExportError> {
        let name = &report.factor;
        self.write_table(&format!("{name}_daily_ic.csv"), &report.daily)?;
        self.write_table(&format!("{name}_summary.csv"), std::slice::from_ref(&report.summary))?;
        self.write_table(&format!("{name}_ts_summary.csv"), &report.entity_ts)?;
        self.write_table(
            &format!("{name}_portfolios.csv"),
            &report.portfolios.bucket_returns,
        )?;
        self.write_table(
            &format!("{name}_long_short.csv"),
            &report.portfolios.long_short,
        )?;
        self.write_table(
            &format!("{name}_cumulative.csv"),
            &report.portfolios.bucket_cumulative,
        )?;
        self.write_table(
            &format!("{name}_long_short_cumulative.csv"),
            &report.portfolios.long_short_cumulative,
        )?;
        Ok(())
    }
}

impl FactorSink for CsvSink {
    fn write_factor(&mut self, series: &FactorSeries) -> Result<(), SinkError> {
        self.write_series(series)
            .map(|_| ())
            .map_err(|e| SinkError(Box::new(e)))
    }
}
