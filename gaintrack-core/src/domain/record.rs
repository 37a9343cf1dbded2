//! TradingDay and TrackingRecord, the two values that flow through the pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;
use crate::thresholds::Thresholds;

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Open and close of the most recent completed trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradingDay {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

impl TradingDay {
    /// A day is usable when both prices are finite, the open is strictly
    /// positive and the close is not negative.
    pub fn is_sane(&self) -> bool {
        self.open.is_finite() && self.close.is_finite() && self.open > 0.0 && self.close >= 0.0
    }
}

/// One ledger row.
///
/// All numeric fields are rounded to two decimal places at construction.
/// `targets_reached` is always an ascending subset of the thresholds that
/// were configured when the row was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub date: NaiveDate,
    pub starting_price: f64,
    pub ending_price: f64,
    pub daily_change_pct: f64,
    pub targets_reached: Vec<f64>,
}

impl TrackingRecord {
    /// Build a record from an acquired day.
    ///
    /// The change percentage is computed from the unrounded prices and then
    /// rounded. Targets are evaluated against the rounded percentage so the
    /// stored row and the summary always agree.
    pub fn compute(day: &TradingDay, thresholds: &Thresholds) -> Result<Self, LedgerError> {
        if !day.is_sane() {
            return Err(LedgerError::InvalidPriceData {
                date: day.date,
                open: day.open,
                close: day.close,
            });
        }

        let daily_change_pct = round2((day.close - day.open) / day.open * 100.0);

        Ok(Self {
            date: day.date,
            starting_price: round2(day.open),
            ending_price: round2(day.close),
            daily_change_pct,
            targets_reached: thresholds.targets_reached(daily_change_pct),
        })
    }
}
