//! factorlab backtest — evaluation of factor series against forward returns.
//!
//! This crate builds on `factorlab-core` to provide:
//! - Forward-return construction per entity
//! - Daily cross-sectional IC/RankIC with sparse-date skip policy
//! - Per-entity time-series IC/RankIC (the thin-panel fallback metric)
//! - Quantile portfolios with tie-collapse handling and long-short spread
//! - Panel CSV loading and a deterministic synthetic generator
//! - CSV export of factor series and metrics reports
//! - TOML run configuration and end-to-end orchestration

pub mod config;
pub mod data_loader;
pub mod evaluate;
pub mod export;
pub mod forward;
pub mod ic;
pub mod quantile;
pub mod report;
pub mod runner;
mod stats;

pub use config::{BacktestSection, ConfigError, DataConfig, RunConfig};
pub use data_loader::{load_panel_csv, synthetic_panel, LoadError};
pub use evaluate::{evaluate, EvalConfig, EvalError};
pub use export::{CsvSink, ExportError};
pub use forward::{forward_returns, ForwardReturns};
pub use report::{
    BucketCumulative, BucketReturn, DailyIc, EntityTsIc, IcSummary, LongShortCumulative,
    LongShortReturn, MetricsReport, PortfolioTables, SkipCounters,
};
pub use runner::{
    build_feature_frame, run_factor_backtest, run_from_config, FactorBacktest, RunError,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<MetricsReport>();
        assert_sync::<MetricsReport>();
        assert_send::<PortfolioTables>();
        assert_sync::<PortfolioTables>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
        assert_send::<EvalConfig>();
        assert_sync::<EvalConfig>();
    }

    #[test]
    fn result_types_are_send_sync() {
        assert_send::<FactorBacktest>();
        assert_sync::<FactorBacktest>();
        assert_send::<ForwardReturns>();
        assert_sync::<ForwardReturns>();
    }
}
