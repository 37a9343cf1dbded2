//! One tracking run: acquire the latest trading day, record it if new,
//! report the summary.

use std::fmt;

use chrono::{Local, NaiveDate};
use log::info;
use thiserror::Error;

use crate::acquire::{AcquireError, Acquirer};
use crate::data::{DataError, MarketDataProvider};
use crate::ledger::{Ledger, LedgerError, RecordOutcome};
use crate::summary::render_summary;
use crate::thresholds::Thresholds;

/// Fatal failures of a run. Duplicate and missing data are outcomes, not
/// errors.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("market data provider failed: {0}")]
    Provider(#[from] DataError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// What a single update did.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackOutcome {
    Recorded {
        date: NaiveDate,
        change_pct: f64,
    },
    AlreadyRecorded {
        date: NaiveDate,
    },
    NoDataAvailable {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl TrackOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, TrackOutcome::Recorded { .. })
    }
}

impl From<RecordOutcome> for TrackOutcome {
    fn from(outcome: RecordOutcome) -> Self {
        match outcome {
            RecordOutcome::Recorded { date, change_pct } => {
                TrackOutcome::Recorded { date, change_pct }
            }
            RecordOutcome::AlreadyRecorded { date } => TrackOutcome::AlreadyRecorded { date },
        }
    }
}

impl fmt::Display for TrackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackOutcome::Recorded { date, change_pct } => {
                write!(f, "Recorded data for {date}: {change_pct:.2}% change")
            }
            TrackOutcome::AlreadyRecorded { date } => {
                write!(f, "Data for {date} already recorded")
            }
            TrackOutcome::NoDataAvailable { symbol, start, end } => {
                write!(f, "No data available for {symbol} between {start} and {end}")
            }
        }
    }
}

pub struct DailyTracker<P> {
    acquirer: Acquirer<P>,
    ledger: Ledger,
    thresholds: Thresholds,
}

impl<P: MarketDataProvider> DailyTracker<P> {
    pub fn new(acquirer: Acquirer<P>, ledger: Ledger, thresholds: Thresholds) -> Self {
        Self {
            acquirer,
            ledger,
            thresholds,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Run the fetch-and-record step against today's local date.
    pub fn update(&mut self) -> Result<TrackOutcome, TrackerError> {
        self.update_as_of(Local::now().date_naive())
    }

    pub fn update_as_of(&mut self, today: NaiveDate) -> Result<TrackOutcome, TrackerError> {
        let day = match self.acquirer.fetch_latest_trading_day_as_of(today) {
            Ok(day) => day,
            Err(AcquireError::NoDataAvailable { symbol, start, end }) => {
                info!("no bars for {symbol} in {start}..={end}; ledger unchanged");
                return Ok(TrackOutcome::NoDataAvailable { symbol, start, end });
            }
            Err(AcquireError::Provider(e)) => return Err(e.into()),
        };

        let outcome = self.ledger.record_if_new(&day, &self.thresholds)?;
        info!(
            "{}: {:?} ({} row(s) in ledger)",
            self.acquirer.symbol(),
            outcome,
            self.ledger.len()
        );
        Ok(outcome.into())
    }

    /// The threshold report over everything recorded so far.
    pub fn summary(&self) -> String {
        render_summary(self.ledger.records(), &self.thresholds)
    }
}
