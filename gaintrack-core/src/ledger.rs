//! Append-only CSV ledger, one row per trading day.
//!
//! Features:
//! - A missing file is a first run and loads as an empty ledger
//! - At most one row per date; re-recording a date is a no-op
//! - Every append rewrites the whole table atomically (write to a temp file
//!   in the same directory, fsync, rename into place)

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;
use serde::Deserialize;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::domain::{TrackingRecord, TradingDay};
use crate::thresholds::{parse_targets, render_targets, Thresholds};

/// Fixed column order of the persisted ledger.
pub const LEDGER_HEADER: [&str; 5] = [
    "date",
    "starting_price",
    "ending_price",
    "daily_change_pct",
    "targets_reached",
];

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid price data for {date}: open={open}, close={close}")]
    InvalidPriceData {
        date: NaiveDate,
        open: f64,
        close: f64,
    },

    #[error("ledger storage unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ledger file {} is corrupt: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}

/// Result of an attempt to record a trading day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordOutcome {
    Recorded { date: NaiveDate, change_pct: f64 },
    AlreadyRecorded { date: NaiveDate },
}

/// One CSV row as stored on disk.
#[derive(Debug, Deserialize)]
struct LedgerRow {
    date: NaiveDate,
    starting_price: f64,
    ending_price: f64,
    daily_change_pct: f64,
    targets_reached: String,
}

/// In-memory ledger backed by a CSV file.
///
/// Records keep arrival order, which is not necessarily date order if a day
/// was back-filled.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    records: Vec<TrackingRecord>,
    dates: HashSet<NaiveDate>,
}

impl Ledger {
    /// Load the ledger at `path`, or start empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("no ledger at {}; starting a new one", path.display());
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(LedgerError::StorageUnavailable { path, source }),
        };

        let records = read_records(&path, file)?;
        let mut dates = HashSet::with_capacity(records.len());
        for rec in &records {
            if !dates.insert(rec.date) {
                return Err(LedgerError::Corrupt {
                    path,
                    reason: format!("duplicate date {}", rec.date),
                });
            }
        }

        info!(
            "loaded {} ledger row(s) from {}",
            records.len(),
            path.display()
        );
        Ok(Self {
            path,
            records,
            dates,
        })
    }

    /// An empty ledger that will be written to `path` on the first append.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
            dates: HashSet::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[TrackingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Append `day` unless its date is already recorded, then persist.
    ///
    /// On any error the in-memory ledger is left exactly as it was.
    pub fn record_if_new(
        &mut self,
        day: &TradingDay,
        thresholds: &Thresholds,
    ) -> Result<RecordOutcome, LedgerError> {
        if self.contains(day.date) {
            return Ok(RecordOutcome::AlreadyRecorded { date: day.date });
        }

        let record = TrackingRecord::compute(day, thresholds)?;
        let change_pct = record.daily_change_pct;

        self.records.push(record);
        if let Err(e) = self.save() {
            self.records.pop();
            return Err(e);
        }
        self.dates.insert(day.date);

        Ok(RecordOutcome::Recorded {
            date: day.date,
            change_pct,
        })
    }

    /// Rewrite the whole ledger file.
    ///
    /// The table is written to a temp file next to the target and renamed
    /// over it, so readers see either the old file or the new one. The temp
    /// file is removed if anything fails before the rename.
    pub fn save(&self) -> Result<(), LedgerError> {
        let storage_err = |source: io::Error| LedgerError::StorageUnavailable {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(storage_err)?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(storage_err)?;
        write_records(&mut tmp, &self.records).map_err(storage_err)?;
        tmp.as_file().sync_all().map_err(storage_err)?;
        tmp.persist(&self.path).map_err(|e| storage_err(e.error))?;

        Ok(())
    }
}

fn read_records(path: &Path, file: File) -> Result<Vec<TrackingRecord>, LedgerError> {
    let corrupt = |reason: String| LedgerError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::Reader::from_reader(io::BufReader::new(file));
    let headers = reader.headers().map_err(|e| csv_error(path, e))?;
    let found: Vec<&str> = headers.iter().map(str::trim).collect();
    if found != LEDGER_HEADER {
        return Err(corrupt(format!(
            "unexpected header [{}]",
            found.join(",")
        )));
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<LedgerRow>() {
        let row = row.map_err(|e| csv_error(path, e))?;
        let targets_reached = parse_targets(&row.targets_reached)
            .map_err(|reason| corrupt(format!("row {}: {reason}", row.date)))?;
        records.push(TrackingRecord {
            date: row.date,
            starting_price: row.starting_price,
            ending_price: row.ending_price,
            daily_change_pct: row.daily_change_pct,
            targets_reached,
        });
    }
    Ok(records)
}

fn write_records<W: Write>(out: W, records: &[TrackingRecord]) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(LEDGER_HEADER)?;
    for rec in records {
        wtr.write_record([
            &rec.date.to_string(),
            &format!("{:.2}", rec.starting_price),
            &format!("{:.2}", rec.ending_price),
            &format!("{:.2}", rec.daily_change_pct),
            &render_targets(&rec.targets_reached),
        ])?;
    }
    wtr.flush()
}

/// I/O failures while reading are storage problems; anything else means the
/// file content is malformed.
fn csv_error(path: &Path, err: csv::Error) -> LedgerError {
    if err.is_io_error() {
        LedgerError::StorageUnavailable {
            path: path.to_path_buf(),
            source: io::Error::from(err),
        }
    } else {
        LedgerError::Corrupt {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }
}
