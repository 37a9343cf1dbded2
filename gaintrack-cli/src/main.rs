//! gaintrack CLI: record the latest trading day and report threshold hits.
//!
//! Commands:
//! - `track` (default): fetch the latest trading day, record it if new,
//!   print the outcome and the summary
//! - `summary`: print the summary of the existing ledger without fetching
//!
//! Settings resolve as: command-line flags, then `--config` TOML, then
//! built-in defaults.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::{error, info, LevelFilter};

use gaintrack_core::{
    render_summary, Acquirer, DailyTracker, Ledger, Thresholds, TrackerConfig, YahooProvider,
};

#[derive(Parser, Debug)]
#[command(
    name = "gaintrack",
    version,
    about = "Track daily gains of a stock and count how often percentage targets are hit"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ticker symbol to track. Defaults to AMD.
    #[arg(long, global = true)]
    symbol: Option<String>,

    /// Ledger CSV path. Defaults to ./amd_stock_tracking.csv.
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Percentage target; repeat for several (e.g. --threshold 1.2 --threshold 2.2).
    #[arg(long = "threshold", global = true, allow_negative_numbers = true)]
    thresholds: Vec<f64>,

    /// Calendar days to look back for the latest trading day (7 to 366).
    #[arg(long, global = true)]
    lookback_days: Option<u32>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Fetch the latest trading day, record it if new, print the summary.
    Track,
    /// Print the summary of the recorded days without fetching.
    Summary,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    match cli.command.unwrap_or(Commands::Track) {
        Commands::Track => run_track(&config),
        Commands::Summary => run_summary(&config),
    }
}

/// Logs go to stderr so stdout carries only the report. `RUST_LOG`
/// overrides the level chosen by `-v`.
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.as_str().to_lowercase()),
    )
    .format(|buf, record| {
        let ts = chrono::Local::now().format("%H:%M:%S%.3f");
        writeln!(
            buf,
            "[{} {:<5} {}] {}",
            ts,
            record.level(),
            record.target(),
            record.args()
        )
    })
    .target(env_logger::Target::Stderr)
    .init();
}

fn resolve_config(cli: &Cli) -> Result<TrackerConfig> {
    let mut config = match &cli.config {
        Some(path) => TrackerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TrackerConfig::default(),
    };

    if let Some(symbol) = &cli.symbol {
        config.symbol = symbol.clone();
    }
    if let Some(ledger) = &cli.ledger {
        config.ledger_path = ledger.clone();
    }
    if !cli.thresholds.is_empty() {
        config.thresholds = Thresholds::new(cli.thresholds.iter().copied())?;
    }
    if let Some(days) = cli.lookback_days {
        config.lookback_days = days;
    }

    config.validate()?;
    Ok(config)
}

fn run_track(config: &TrackerConfig) -> Result<()> {
    let provider =
        YahooProvider::new(&config.provider).context("failed to set up market data client")?;
    let acquirer = Acquirer::new(provider, config.symbol.clone(), config.lookback_days);
    let ledger = open_ledger(config)?;
    let mut tracker = DailyTracker::new(acquirer, ledger, config.thresholds.clone());

    let outcome = tracker
        .update()
        .with_context(|| format!("daily update for {} failed", config.symbol))?;
    info!("run finished: {outcome:?}");

    println!("{outcome}");
    println!();
    println!("{}", tracker.summary());
    Ok(())
}

fn run_summary(config: &TrackerConfig) -> Result<()> {
    let ledger = open_ledger(config)?;
    println!("{}", render_summary(ledger.records(), &config.thresholds));
    Ok(())
}

fn open_ledger(config: &TrackerConfig) -> Result<Ledger> {
    Ledger::open(&config.ledger_path)
        .with_context(|| format!("failed to load ledger {}", config.ledger_path.display()))
}
