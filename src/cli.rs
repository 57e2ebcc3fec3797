//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::aggregator::TradeAggregator;
use crate::domain::backtest::run_backtest;
use crate::domain::bar::Bar;
use crate::domain::config_validation::{RunConfig, load_run_config};
use crate::domain::error::TrendswapError;
use crate::domain::live::LiveSession;
use crate::domain::pipeline::IndicatorPipeline;
use crate::domain::series::SeriesStore;
use crate::logging;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "trendswap", about = "Intraday trend-swap backtester")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over a bar file
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Bar CSV, overrides [data] bars
        #[arg(long)]
        data: Option<PathBuf>,
        /// Report directory, overrides [report] output_dir
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replay a bar file one bar at a time in forward mode
    Live {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Write the enriched indicator series
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    logging::init(cli.verbose);

    let result = match cli.command {
        Command::Backtest {
            config,
            data,
            output,
        } => run_backtest_command(&config, data.as_deref(), output.as_deref()),
        Command::Live { config, data } => run_live(&config, data.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Indicators {
            config,
            data,
            output,
        } => run_indicators(&config, data.as_deref(), output.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<RunConfig, TrendswapError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    load_run_config(&adapter)
}

/// Bars from `--data`, falling back to `[data] bars`.
pub fn load_bars(config: &RunConfig, data: Option<&Path>) -> Result<Vec<Bar>, TrendswapError> {
    let path = data
        .map(Path::to_path_buf)
        .or_else(|| config.data.bars.clone())
        .ok_or_else(|| TrendswapError::ConfigMissing {
            section: "data".into(),
            key: "bars".into(),
        })?;
    let bars = CsvAdapter::new(path).fetch_bars(config.data.start_date, config.data.end_date)?;
    if bars.is_empty() {
        return Err(TrendswapError::Data {
            reason: "no bars in the selected date range".into(),
        });
    }
    info!(bars = bars.len(), "bars loaded");
    Ok(bars)
}

fn output_dir(config: &RunConfig, output: Option<&Path>) -> PathBuf {
    output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output_dir.clone())
}

fn run_backtest_command(
    config_path: &Path,
    data: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), TrendswapError> {
    let config = load_config(config_path)?;
    let bars = load_bars(&config, data)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run_backtest(
        &bars,
        config.indicators.clone(),
        config.engine.clone(),
    ))?;

    let report = CsvReportAdapter::new(output_dir(&config, output))?;
    report.write_trades(&result.trades)?;
    report.write_series(&result.store)?;
    report.write_summary(&result.stats)?;

    eprintln!("\n=== Backtest Summary ===");
    eprint!("{}", result.stats);
    eprintln!("\nReport written to: {}", report.dir().display());
    Ok(())
}

fn run_live(config_path: &Path, data: Option<&Path>) -> Result<(), TrendswapError> {
    let config = load_config(config_path)?;
    let bars = load_bars(&config, data)?;

    let mut session = LiveSession::new(
        config.indicators.clone(),
        config.engine.clone(),
        TradeAggregator::new(),
    );
    for bar in bars {
        session.on_bar(bar)?;
    }
    let aggregator = session.finish()?;

    eprintln!("\n=== Live Replay Summary ===");
    eprint!("{}", aggregator.stats());
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), TrendswapError> {
    let config = load_config(config_path)?;
    eprintln!(
        "Configuration OK: direction mode {:?}, exit policy {}",
        config.indicators.direction_mode,
        config.engine.exit_policy.name()
    );
    Ok(())
}

fn run_indicators(
    config_path: &Path,
    data: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), TrendswapError> {
    let config = load_config(config_path)?;
    let bars = load_bars(&config, data)?;

    let mut store = SeriesStore::from_bars(&bars)?;
    IndicatorPipeline::new(config.indicators.clone(), config.session()).run(&mut store)?;

    let report = CsvReportAdapter::new(output_dir(&config, output))?;
    report.write_series(&store)?;
    eprintln!(
        "Wrote {} rows to {}",
        store.len(),
        report.dir().join(crate::adapters::csv_report_adapter::SERIES_FILE).display()
    );
    Ok(())
}
