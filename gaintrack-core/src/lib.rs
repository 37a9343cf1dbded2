//! gaintrack core: daily gain tracking for a single equity symbol.
//!
//! This crate contains the whole tracking pipeline:
//! - Market data provider trait and the Yahoo Finance implementation
//! - Lookback-window acquisition of the latest completed trading day
//! - Append-only CSV ledger with one row per trading day
//! - Threshold-hit summary over the ledger
//! - TOML configuration

pub mod acquire;
pub mod config;
pub mod data;
pub mod domain;
pub mod ledger;
pub mod summary;
pub mod thresholds;
pub mod tracker;

pub use acquire::{AcquireError, Acquirer};
pub use config::{ConfigError, ProviderConfig, TrackerConfig};
pub use data::{DailyBar, DataError, MarketDataProvider, YahooProvider};
pub use domain::{round2, TrackingRecord, TradingDay};
pub use ledger::{Ledger, LedgerError, RecordOutcome};
pub use summary::{render_summary, summarize, Summary, ThresholdHit, NO_DATA_MESSAGE};
pub use thresholds::Thresholds;
pub use tracker::{DailyTracker, TrackOutcome, TrackerError};
