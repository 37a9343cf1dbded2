//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;
use gaintrack_core::{DailyBar, DataError, MarketDataProvider};

/// Provider serving a fixed bar list, filtered to the requested window.
pub struct InMemoryProvider {
    bars: Mutex<Vec<DailyBar>>,
    failure: Mutex<Option<DataError>>,
    calls: AtomicUsize,
}

impl InMemoryProvider {
    pub fn new(bars: Vec<DailyBar>) -> Self {
        Self {
            bars: Mutex::new(bars),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: DataError) -> Self {
        let p = Self::new(Vec::new());
        *p.failure.lock().unwrap() = Some(err);
        p
    }

    pub fn push(&self, bar: DailyBar) {
        self.bars.lock().unwrap().push(bar);
    }

    /// Swap the bar for `bar.date`, as when a partial session settles.
    pub fn replace(&self, bar: DailyBar) {
        let mut bars = self.bars.lock().unwrap();
        bars.retain(|b| b.date != bar.date);
        bars.push(bar);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarketDataProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn fetch(
        &self,
        _symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure.lock().unwrap().take() {
            return Err(err);
        }
        let mut bars: Vec<DailyBar> = self
            .bars
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .copied()
            .collect();
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl<'a> MarketDataProvider for &'a InMemoryProvider {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, DataError> {
        (**self).fetch(symbol, start, end)
    }
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn bar(date: NaiveDate, open: f64, close: f64) -> DailyBar {
    DailyBar { date, open, close }
}
