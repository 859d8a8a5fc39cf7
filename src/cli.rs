//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::{CsvBarSource, CsvOptions};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::trade_log_adapter::CsvTradeWriter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::validate_backtest_config;
use crate::domain::error::ConfluenceError;
use crate::domain::execution::{EntrySettings, ExitSettings};
use crate::domain::metrics::Metrics;
use crate::domain::position::ClosedTrade;
use crate::domain::score::IndicatorSettings;
use crate::ports::config_port::ConfigPort;

const DEFAULT_LOT_SIZE: f64 = 100_000.0;

#[derive(Parser, Debug)]
#[command(name = "confluence", about = "Multi-indicator confluence backtester")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a bar file through the strategy
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Bar file, overriding [data] path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Trade log CSV, overriding [report] trades_out
        #[arg(short, long)]
        trades_out: Option<PathBuf>,
    },
    /// Validate a configuration file and print the resolved thresholds
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print a configuration file holding every default
    Defaults,
}

/// Everything a backtest run needs, resolved from the INI file and CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub backtest: BacktestConfig,
    pub data_path: Option<PathBuf>,
    pub csv: CsvOptions,
    pub lot_size: f64,
    pub trades_out: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);
    match cli.command {
        Command::Backtest {
            config,
            data,
            trades_out,
        } => run_backtest(&config, data, trades_out),
        Command::Validate { config } => run_validate(&config),
        Command::Defaults => {
            print!("{}", default_ini());
            ExitCode::SUCCESS
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // a subscriber may already be installed when embedded in tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_indicator_settings(adapter: &dyn ConfigPort) -> Result<IndicatorSettings, ConfluenceError> {
    const S: &str = "indicators";
    let d = IndicatorSettings::default();
    Ok(IndicatorSettings {
        rsi_overbought: adapter.get_double(S, "rsi_overbought", d.rsi_overbought)?,
        rsi_oversold: adapter.get_double(S, "rsi_oversold", d.rsi_oversold)?,
        window: adapter.get_usize(S, "window", d.window)?,
        fast_window: adapter.get_usize(S, "fast_window", d.fast_window)?,
        macd_fast: adapter.get_usize(S, "macd_fast", d.macd_fast)?,
        macd_slow: adapter.get_usize(S, "macd_slow", d.macd_slow)?,
        macd_signal: adapter.get_usize(S, "macd_signal", d.macd_signal)?,
        atr_period: adapter.get_usize(S, "atr_period", d.atr_period)?,
        sar_acceleration: adapter.get_double(S, "sar_acceleration", d.sar_acceleration)?,
        sar_maximum: adapter.get_double(S, "sar_maximum", d.sar_maximum)?,
        vwap_period: adapter.get_usize(S, "vwap_period", d.vwap_period)?,
        cmf_period: adapter.get_usize(S, "cmf_period", d.cmf_period)?,
    })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, ConfluenceError> {
    let entry = EntrySettings::default();
    let exit = ExitSettings::default();
    Ok(BacktestConfig {
        indicators: build_indicator_settings(adapter)?,
        entry: EntrySettings {
            score_threshold: adapter.get_double("entry", "score_threshold", entry.score_threshold)?,
            min_atr: adapter.get_double("entry", "min_atr", entry.min_atr)?,
            max_atr: adapter.get_double("entry", "max_atr", entry.max_atr)?,
            price_reversal: adapter.get_double("entry", "price_reversal", entry.price_reversal)?,
            entry_adjustment: adapter.get_double("entry", "entry_adjustment", entry.entry_adjustment)?,
            liquidity_factor: adapter.get_double("entry", "liquidity_factor", entry.liquidity_factor)?,
        },
        exit: ExitSettings {
            tp_atr_multiplier: adapter.get_double("exit", "tp_atr_multiplier", exit.tp_atr_multiplier)?,
            sl_atr_multiplier: adapter.get_double("exit", "sl_atr_multiplier", exit.sl_atr_multiplier)?,
            fee: adapter.get_double("exit", "fee", exit.fee)?,
        },
    })
}

/// Resolve the full run from `adapter`, validating thresholds and the report
/// section.
pub fn build_run_settings(adapter: &dyn ConfigPort) -> Result<RunSettings, ConfluenceError> {
    let backtest = build_backtest_config(adapter)?;
    validate_backtest_config(&backtest)?;

    let lot_size = adapter.get_double("report", "lot_size", DEFAULT_LOT_SIZE)?;
    if !(lot_size > 0.0 && lot_size.is_finite()) {
        return Err(ConfluenceError::invalid("report", "lot_size", "lot_size must be positive"));
    }

    Ok(RunSettings {
        backtest,
        data_path: adapter.get_string("data", "path").map(PathBuf::from),
        csv: CsvOptions {
            skip_rows: adapter.get_usize("data", "skip_rows", 0)?,
            has_headers: adapter.get_bool("data", "has_headers", false)?,
        },
        lot_size,
        trades_out: adapter.get_string("report", "trades_out").map(PathBuf::from),
    })
}

/// Load bars, run the session and write the optional trade log.
pub fn run_backtest_pipeline(settings: &RunSettings) -> Result<(BacktestResult, Metrics), ConfluenceError> {
    let data_path = settings
        .data_path
        .as_ref()
        .ok_or_else(|| ConfluenceError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;
    let mut source = CsvBarSource::open(data_path, settings.csv.clone())?;

    let result = match &settings.trades_out {
        Some(path) => {
            let mut writer = CsvTradeWriter::create(path)?;
            backtest_engine::run_backtest(&mut source, settings.backtest.clone(), &mut writer)?
        }
        None => {
            let mut sink: Vec<ClosedTrade> = Vec::new();
            backtest_engine::run_backtest(&mut source, settings.backtest.clone(), &mut sink)?
        }
    };
    let metrics = Metrics::compute(&result.trades, settings.lot_size);
    Ok((result, metrics))
}

fn run_backtest(config_path: &Path, data: Option<PathBuf>, trades_out: Option<PathBuf>) -> ExitCode {
    // Stage 1: Load and resolve config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let mut settings = match build_run_settings(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 2: CLI overrides
    if data.is_some() {
        settings.data_path = data;
    }
    if trades_out.is_some() {
        settings.trades_out = trades_out;
    }
    if let Some(path) = &settings.data_path {
        eprintln!("Replaying bars from {}", path.display());
    }

    // Stage 3: Run
    let (result, metrics) = match run_backtest_pipeline(&settings) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: Console summary
    print_summary(&result, &metrics);
    if let Some(path) = &settings.trades_out {
        eprintln!("\nTrade log written to: {}", path.display());
    }
    ExitCode::SUCCESS
}

fn print_summary(result: &BacktestResult, metrics: &Metrics) {
    eprintln!("\n=== Results ===");
    eprintln!("Bars Read:        {}", result.bars_seen);
    eprintln!("Bars Evaluated:   {}", result.steps_evaluated);
    eprintln!("Total Trades:     {}", metrics.total_trades);
    eprintln!("Winners:          {}", metrics.trades_won);
    eprintln!("Losers:           {}", metrics.trades_lost);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    eprintln!("Average Win:      {:.5}", metrics.avg_win);
    eprintln!("Average Loss:     {:.5}", metrics.avg_loss);
    eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);
    eprintln!("Net PnL:          {:.5}", metrics.net_pnl);
    eprintln!("Net PnL (lots):   {:.2}", metrics.net_pnl_lots);

    if metrics.total_trades > 0 {
        eprintln!("\n=== Exits ===");
        for (reason, count) in &metrics.exits {
            eprintln!("  {reason:<12} {count}");
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let settings = match build_run_settings(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let c = &settings.backtest;
    eprintln!("\nIndicators:");
    eprintln!(
        "  RSI:      window {}, overbought {}, oversold {}",
        c.indicators.window, c.indicators.rsi_overbought, c.indicators.rsi_oversold
    );
    eprintln!("  SMA:      fast {}, slow {}", c.indicators.fast_window, c.indicators.window);
    eprintln!(
        "  MACD:     {}/{}/{}",
        c.indicators.macd_fast, c.indicators.macd_slow, c.indicators.macd_signal
    );
    eprintln!("  ATR:      {}", c.indicators.atr_period);
    eprintln!(
        "  SAR:      step {}, maximum {}",
        c.indicators.sar_acceleration, c.indicators.sar_maximum
    );
    eprintln!("  VWAP/CMF: {}/{}", c.indicators.vwap_period, c.indicators.cmf_period);
    eprintln!("  Window:   {} bars", c.indicators.window_capacity());
    eprintln!("\nEntry:");
    eprintln!("  Score threshold:  {}", c.entry.score_threshold);
    eprintln!("  ATR band:         ({}, {})", c.entry.min_atr, c.entry.max_atr);
    eprintln!("  Pullback:         {}", c.entry.price_reversal);
    eprintln!("  Slippage:         {}", c.entry.entry_adjustment);
    eprintln!("  Liquidity factor: {}", c.entry.liquidity_factor);
    eprintln!("\nExit:");
    eprintln!("  Take profit:      {} x ATR", c.exit.tp_atr_multiplier);
    eprintln!("  Stop loss:        {} x ATR", c.exit.sl_atr_multiplier);
    eprintln!("  Fee:              {}", c.exit.fee);
    match &settings.data_path {
        Some(path) => eprintln!("\nData: {}", path.display()),
        None => eprintln!("\nData: (none, pass --data to backtest)"),
    }
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

/// An INI document holding every default value.
pub fn default_ini() -> String {
    let i = IndicatorSettings::default();
    let e = EntrySettings::default();
    let x = ExitSettings::default();
    format!(
        "[indicators]\n\
         rsi_overbought = {}\n\
         rsi_oversold = {}\n\
         window = {}\n\
         fast_window = {}\n\
         macd_fast = {}\n\
         macd_slow = {}\n\
         macd_signal = {}\n\
         atr_period = {}\n\
         sar_acceleration = {}\n\
         sar_maximum = {}\n\
         vwap_period = {}\n\
         cmf_period = {}\n\
         \n\
         [entry]\n\
         score_threshold = {}\n\
         min_atr = {}\n\
         max_atr = {}\n\
         price_reversal = {}\n\
         entry_adjustment = {}\n\
         liquidity_factor = {}\n\
         \n\
         [exit]\n\
         tp_atr_multiplier = {}\n\
         sl_atr_multiplier = {}\n\
         fee = {}\n\
         \n\
         [data]\n\
         ; path = bars.csv\n\
         skip_rows = 0\n\
         has_headers = false\n\
         \n\
         [report]\n\
         lot_size = {}\n\
         ; trades_out = trades.csv\n",
        i.rsi_overbought,
        i.rsi_oversold,
        i.window,
        i.fast_window,
        i.macd_fast,
        i.macd_slow,
        i.macd_signal,
        i.atr_period,
        i.sar_acceleration,
        i.sar_maximum,
        i.vwap_period,
        i.cmf_period,
        e.score_threshold,
        e.min_atr,
        e.max_atr,
        e.price_reversal,
        e.entry_adjustment,
        e.liquidity_factor,
        x.tp_atr_multiplier,
        x.sl_atr_multiplier,
        x.fee,
        DEFAULT_LOT_SIZE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ini_round_trips_to_defaults() {
        let adapter = FileConfigAdapter::from_string(&default_ini()).unwrap();
        let settings = build_run_settings(&adapter).unwrap();
        assert_eq!(settings.backtest, BacktestConfig::default());
        assert_eq!(settings.lot_size, DEFAULT_LOT_SIZE);
        assert_eq!(settings.data_path, None);
        assert_eq!(settings.csv, CsvOptions::default());
        assert_eq!(settings.trades_out, None);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let adapter = FileConfigAdapter::from_string("").unwrap();
        let config = build_backtest_config(&adapter).unwrap();
        assert_eq!(config, BacktestConfig::default());
    }

    #[test]
    fn overrides_are_read() {
        let adapter = FileConfigAdapter::from_string(
            "[indicators]\nwindow = 20\nmacd_slow = 30\n[entry]\nmin_atr = 0.0001\n[exit]\nfee = 0\n",
        )
        .unwrap();
        let config = build_backtest_config(&adapter).unwrap();
        assert_eq!(config.indicators.window, 20);
        assert_eq!(config.indicators.macd_slow, 30);
        assert_eq!(config.entry.min_atr, 0.0001);
        assert_eq!(config.exit.fee, 0.0);
    }

    #[test]
    fn invalid_threshold_fails_settings() {
        let adapter = FileConfigAdapter::from_string("[entry]\nscore_threshold = 2\n").unwrap();
        let err = build_run_settings(&adapter).unwrap_err();
        assert!(matches!(err, ConfluenceError::ConfigInvalid { .. }));
    }

    #[test]
    fn negative_lot_size_rejected() {
        let adapter = FileConfigAdapter::from_string("[report]\nlot_size = -1\n").unwrap();
        assert!(build_run_settings(&adapter).is_err());
    }

    #[test]
    fn missing_data_path_is_reported() {
        let adapter = FileConfigAdapter::from_string("").unwrap();
        let settings = build_run_settings(&adapter).unwrap();
        let err = run_backtest_pipeline(&settings).unwrap_err();
        assert!(matches!(err, ConfluenceError::ConfigMissing { .. }));
    }

    #[test]
    fn cli_parses_backtest_flags() {
        let cli = Cli::parse_from([
            "confluence",
            "-v",
            "backtest",
            "--config",
            "c.ini",
            "--data",
            "bars.csv",
        ]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Backtest { config, data, trades_out } => {
                assert_eq!(config, PathBuf::from("c.ini"));
                assert_eq!(data, Some(PathBuf::from("bars.csv")));
                assert_eq!(trades_out, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
