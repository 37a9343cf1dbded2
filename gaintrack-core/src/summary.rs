//! Threshold-hit summary over the ledger.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::TrackingRecord;
use crate::thresholds::{format_threshold, Thresholds};

/// Report text for an empty ledger.
pub const NO_DATA_MESSAGE: &str = "No data recorded yet.";

const RULE_WIDTH: usize = 50;

/// How often one threshold was met.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdHit {
    pub threshold: f64,
    pub days_reached: usize,
    /// `days_reached / total_days * 100`.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_days: usize,
    /// One row per threshold, ascending.
    pub rows: Vec<ThresholdHit>,
}

/// Count, for every threshold, the days whose change met or beat it.
///
/// Returns `None` for an empty ledger.
pub fn summarize(records: &[TrackingRecord], thresholds: &Thresholds) -> Option<Summary> {
    if records.is_empty() {
        return None;
    }

    let total_days = records.len();
    let rows = thresholds
        .iter()
        .map(|threshold| {
            let days_reached = records
                .iter()
                .filter(|r| r.daily_change_pct >= threshold)
                .count();
            ThresholdHit {
                threshold,
                days_reached,
                percentage: days_reached as f64 / total_days as f64 * 100.0,
            }
        })
        .collect();

    Some(Summary { total_days, rows })
}

/// The printable report, or [`NO_DATA_MESSAGE`] when nothing is recorded.
pub fn render_summary(records: &[TrackingRecord], thresholds: &Thresholds) -> String {
    summarize(records, thresholds)
        .map(|s| s.to_string())
        .unwrap_or_else(|| NO_DATA_MESSAGE.to_string())
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(RULE_WIDTH);
        writeln!(f, "Summary of {} trading days:", self.total_days)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "{:>10} | {:>12} | {:>10}", "Target", "Days Reached", "Percentage")?;
        writeln!(f, "{rule}")?;
        for row in &self.rows {
            writeln!(
                f,
                "{:>10}% | {:>12} | {:>9.1}%",
                format_threshold(row.threshold),
                row.days_reached,
                row.percentage
            )?;
        }
        write!(f, "{rule}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(day: u32, pct: f64) -> TrackingRecord {
        TrackingRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            starting_price: 100.0,
            ending_price: 100.0 + pct,
            daily_change_pct: pct,
            targets_reached: Vec::new(),
        }
    }

    #[test]
    fn empty_ledger() {
        assert!(summarize(&[], &Thresholds::default()).is_none());
        assert_eq!(render_summary(&[], &Thresholds::default()), "No data recorded yet.");
    }

    #[test]
    fn counts_inclusive_hits() {
        let records = vec![rec(2, 2.0), rec(3, 1.2), rec(4, -0.5), rec(5, 3.1)];
        let s = summarize(&records, &Thresholds::default()).unwrap();
        assert_eq!(s.total_days, 4);
        let counts: Vec<usize> = s.rows.iter().map(|r| r.days_reached).collect();
        assert_eq!(counts, vec![3, 2, 1]);
        assert_eq!(s.rows[0].percentage, 75.0);
        assert_eq!(s.rows[2].percentage, 25.0);
    }

    #[test]
    fn renders_table() {
        let s = summarize(&[rec(2, 2.0)], &Thresholds::default()).unwrap();
        let expected = "\
Summary of 1 trading days:
--------------------------------------------------
    Target | Days Reached | Percentage
--------------------------------------------------
       1.2% |            1 |     100.0%
       1.5% |            1 |     100.0%
       2.2% |            0 |       0.0%
--------------------------------------------------";
        assert_eq!(s.to_string(), expected);
    }

    #[test]
    fn percentage_one_decimal() {
        let records = vec![rec(2, 2.0), rec(3, 0.0), rec(4, 0.0)];
        let text = render_summary(&records, &Thresholds::new([1.0]).unwrap());
        assert!(text.contains("       1.0% |            1 |      33.3%"));
    }
}
