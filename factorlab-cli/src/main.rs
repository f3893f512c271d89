//! factorlab CLI — list, compute, and backtest commands.
//!
//! Commands:
//! - `list` — print every registered factor
//! - `compute` — compute one factor over a panel CSV and export the series
//! - `backtest` — compute and score one factor, printing the report summary

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use factorlab_backtest::{
    build_feature_frame, evaluate, load_panel_csv, run_from_config, synthetic_panel, CsvSink,
    EvalConfig, FactorBacktest, MetricsReport, RunConfig,
};
use factorlab_core::factors::{install_builtin_factors, FactorRegistry};
use factorlab_core::features::FeatureConfig;
use factorlab_core::pipeline::compute_factor;

#[derive(Parser)]
#[command(
    name = "factorlab",
    about = "factorlab CLI — alpha factor computation and backtesting"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every registered factor name.
    List,
    /// Compute one factor over a panel CSV and export the value series.
    Compute {
        /// Factor name (see `list`).
        #[arg(long)]
        factor: String,

        /// Panel CSV: entity,date,open,high,low,close,volume,amount.
        #[arg(long)]
        data: PathBuf,

        /// Output directory for the series CSV.
        #[arg(long, default_value = "results")]
        out: PathBuf,
    },
    /// Compute one factor and score it against forward returns.
    Backtest {
        /// Path to a TOML run config; flags below are ignored if set.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Factor name (required without --config).
        #[arg(long)]
        factor: Option<String>,

        /// Panel CSV path (mutually exclusive with --synthetic).
        #[arg(long)]
        data: Option<PathBuf>,

        /// Use a deterministic synthetic panel instead of a CSV.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Forward-return horizon in observed steps.
        #[arg(long, default_value_t = 1)]
        horizon: usize,

        /// Quantile bucket count.
        #[arg(long, default_value_t = 5)]
        quantiles: usize,

        /// Output directory for report CSVs.
        #[arg(long, default_value = "results")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut registry = FactorRegistry::new();
    install_builtin_factors(&mut registry).context("factor registration failed")?;

    match cli.command {
        Commands::List => run_list(&registry),
        Commands::Compute { factor, data, out } => run_compute(&registry, &factor, &data, &out),
        Commands::Backtest {
            config,
            factor,
            data,
            synthetic,
            horizon,
            quantiles,
            out,
        } => run_backtest_cmd(
            &registry, config, factor, data, synthetic, horizon, quantiles, out,
        ),
    }
}

fn run_list(registry: &FactorRegistry) -> Result<()> {
    for name in registry.list() {
        println!("{name}");
    }
    Ok(())
}

fn run_compute(
    registry: &FactorRegistry,
    factor: &str,
    data: &PathBuf,
    out: &PathBuf,
) -> Result<()> {
    let panel = load_panel_csv(data)
        .with_context(|| format!("failed to load panel {}", data.display()))?;
    let features = build_feature_frame(&panel, &FeatureConfig::default());
    let series = compute_factor(registry, factor, &panel, &features)?;

    let sink = CsvSink::new(out)?;
    let path = sink.write_series(&series)?;
    println!(
        "{}: {} entities x {} dates -> {}",
        series.name(),
        series.n_entities(),
        series.dates().len(),
        path.display()
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_backtest_cmd(
    registry: &FactorRegistry,
    config_path: Option<PathBuf>,
    factor: Option<String>,
    data: Option<PathBuf>,
    synthetic: bool,
    horizon: usize,
    quantiles: usize,
    out: PathBuf,
) -> Result<()> {
    let result: FactorBacktest = if let Some(path) = config_path {
        let config = RunConfig::from_file(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        run_from_config(registry, &config)?
    } else {
        let Some(factor) = factor else {
            bail!("--factor is required without --config");
        };
        let panel = match (&data, synthetic) {
            (Some(_), true) => bail!("--data and --synthetic are mutually exclusive"),
            (None, false) => bail!("one of --data or --synthetic is required"),
            (Some(path), false) => load_panel_csv(path)
                .with_context(|| format!("failed to load panel {}", path.display()))?,
            (None, true) => synthetic_panel(5, 250, 0),
        };
        let features = build_feature_frame(&panel, &FeatureConfig::default());
        let series = compute_factor(registry, &factor, &panel, &features)?;
        let report = evaluate(&series, &panel, &EvalConfig { horizon, quantiles })?;
        FactorBacktest { series, report }
    };

    print_summary(&result.report);

    let sink = CsvSink::new(&out)?;
    sink.write_series(&result.series)?;
    sink.write_report(&result.report)?;
    println!("Artifacts saved to: {}", out.display());
    Ok(())
}

fn print_summary(report: &MetricsReport) {
    println!();
    println!("=== Factor Backtest ===");
    println!("Factor:         {}", report.factor);
    println!("Horizon:        {}", report.horizon);
    println!("Quantiles:      {}", report.quantiles);
    println!();
    println!("--- Cross-Sectional ---");
    println!("Scored days:    {}", report.summary.n_days);
    println!("Mean IC:        {:+.4}", report.summary.mean_ic);
    println!("IC t-stat:      {:+.2}", report.summary.t_stat);
    println!("Mean RankIC:    {:+.4}", report.summary.mean_rank_ic);
    println!("RankIC t-stat:  {:+.2}", report.summary.rank_ic_t_stat);

    // On sparse panels the cross-sectional table can be empty; the
    // per-entity table below is then the readable result.
    if report.daily.is_empty() {
        println!("(no dates with at least 2 covered entities)");
    }

    println!();
    println!("--- Time-Series per entity ---");
    for row in &report.entity_ts {
        println!(
            "{:<12} TS.IC {:+.4}  TS.RankIC {:+.4}  ({} obs)",
            row.entity, row.ts_ic, row.ts_rank_ic, row.n_obs
        );
    }

    if !report.portfolios.long_short.is_empty() {
        let last = &report.portfolios.long_short_cumulative
            [report.portfolios.long_short_cumulative.len() - 1];
        println!();
        println!("--- Quantile Portfolios ---");
        println!(
            "Long-short dates: {}",
            report.portfolios.long_short.len()
        );
        println!("Long-short cumulative: {:.4}", last.cum_return);
    }

    let skips = &report.skips;
    if skips.dates_skipped_coverage > 0 || skips.dates_skipped_buckets > 0 {
        println!();
        println!(
            "Skipped: {} dates below coverage, {} dates below bucket count",
            skips.dates_skipped_coverage, skips.dates_skipped_buckets
        );
    }
    println!();
}
