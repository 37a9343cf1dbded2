//! Acquirer: picks the most recent completed trading day for the tracked
//! symbol.
//!
//! There is one strategy. Request the `lookback_days` calendar days before
//! today, ending yesterday, and take the latest bar in the response. Today's
//! bar is still forming while the market is open, so it is never a
//! candidate. The window is wide enough to span weekends and exchange
//! holidays, so a closed market needs no separate branch.

use chrono::{Days, Local, NaiveDate};
use log::{info, warn};
use thiserror::Error;

use crate::data::{DataError, MarketDataProvider};
use crate::domain::TradingDay;

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("no data available for {symbol} between {start} and {end}")]
    NoDataAvailable {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("market data provider failed: {0}")]
    Provider(#[from] DataError),
}

pub struct Acquirer<P> {
    provider: P,
    symbol: String,
    lookback_days: u32,
}

impl<P: MarketDataProvider> Acquirer<P> {
    pub fn new(provider: P, symbol: impl Into<String>, lookback_days: u32) -> Self {
        Self {
            provider,
            symbol: symbol.into(),
            lookback_days,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The inclusive date window queried when "today" is `today`: from
    /// `lookback_days` back through yesterday. Saturates at the calendar's
    /// lower bound instead of overflowing.
    pub fn window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = today
            .checked_sub_days(Days::new(u64::from(self.lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        let end = today.pred_opt().unwrap_or(today);
        (start, end)
    }

    /// Latest trading day as of the local calendar date.
    pub fn fetch_latest_trading_day(&self) -> Result<TradingDay, AcquireError> {
        self.fetch_latest_trading_day_as_of(Local::now().date_naive())
    }

    /// Latest completed trading day within the lookback window before `today`.
    pub fn fetch_latest_trading_day_as_of(
        &self,
        today: NaiveDate,
    ) -> Result<TradingDay, AcquireError> {
        let (start, end) = self.window(today);
        info!(
            "fetching {} from {} for {start}..={end}",
            self.symbol,
            self.provider.name()
        );

        let no_data = || AcquireError::NoDataAvailable {
            symbol: self.symbol.clone(),
            start,
            end,
        };

        let bars = match self.provider.fetch(&self.symbol, start, end) {
            Ok(bars) => bars,
            Err(DataError::SymbolNotFound { symbol }) => {
                warn!("provider does not know symbol {symbol}");
                return Err(no_data());
            }
            Err(e) => return Err(e.into()),
        };

        // Providers may still hand back a bar past the requested end.
        let latest = bars
            .iter()
            .filter(|b| b.date <= end)
            .max_by_key(|b| b.date)
            .ok_or_else(no_data)?;

        Ok(TradingDay {
            date: latest.date,
            open: latest.open,
            close: latest.close,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DailyBar;
    use std::sync::Mutex;

    /// Provider that replays a fixed response and records the requested range.
    struct FixedProvider {
        response: Mutex<Option<Result<Vec<DailyBar>, DataError>>>,
        requested: Mutex<Option<(String, NaiveDate, NaiveDate)>>,
    }

    impl FixedProvider {
        fn new(response: Result<Vec<DailyBar>, DataError>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                requested: Mutex::new(None),
            }
        }
    }

    impl MarketDataProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fetch(
            &self,
            symbol: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<DailyBar>, DataError> {
            *self.requested.lock().unwrap() = Some((symbol.to_string(), start, end));
            self.response.lock().unwrap().take().unwrap_or(Ok(Vec::new()))
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn bar(date: NaiveDate, open: f64, close: f64) -> DailyBar {
        DailyBar { date, open, close }
    }

    #[test]
    fn picks_latest_bar_and_requests_window() {
        let provider = FixedProvider::new(Ok(vec![
            bar(d(2024, 1, 3), 101.0, 99.0),
            bar(d(2024, 1, 4), 99.5, 100.5),
        ]));
        let acquirer = Acquirer::new(provider, "AMD", 10);

        // Saturday: the latest completed trading day is Thursday the 4th.
        let day = acquirer.fetch_latest_trading_day_as_of(d(2024, 1, 6)).unwrap();
        assert_eq!(day.date, d(2024, 1, 4));
        assert_eq!(day.open, 99.5);
        assert_eq!(day.close, 100.5);

        let requested = acquirer.provider.requested.lock().unwrap().clone().unwrap();
        assert_eq!(requested, ("AMD".to_string(), d(2023, 12, 27), d(2024, 1, 5)));
    }

    #[test]
    fn bar_dated_today_is_never_picked() {
        // Tuesday, mid-session: the feed already carries a partial bar for today.
        let provider = FixedProvider::new(Ok(vec![
            bar(d(2023, 12, 29), 100.0, 101.0),
            bar(d(2024, 1, 2), 100.0, 100.5),
        ]));
        let acquirer = Acquirer::new(provider, "AMD", 10);
        let day = acquirer.fetch_latest_trading_day_as_of(d(2024, 1, 2)).unwrap();
        assert_eq!(day.date, d(2023, 12, 29));
        assert_eq!(day.close, 101.0);
    }

    #[test]
    fn window_ends_yesterday() {
        let acquirer = Acquirer::new(FixedProvider::new(Ok(Vec::new())), "AMD", 7);
        assert_eq!(acquirer.window(d(2024, 3, 1)), (d(2024, 2, 23), d(2024, 2, 29)));
    }

    #[test]
    fn huge_lookback_saturates_instead_of_panicking() {
        let acquirer = Acquirer::new(FixedProvider::new(Ok(Vec::new())), "AMD", u32::MAX);
        let (start, end) = acquirer.window(d(2024, 1, 2));
        assert_eq!(start, NaiveDate::MIN);
        assert_eq!(end, d(2024, 1, 1));
    }

    #[test]
    fn latest_bar_chosen_by_date_not_position() {
        let provider = FixedProvider::new(Ok(vec![
            bar(d(2024, 1, 5), 10.0, 11.0),
            bar(d(2024, 1, 2), 20.0, 21.0),
        ]));
        let acquirer = Acquirer::new(provider, "AMD", 7);
        let day = acquirer.fetch_latest_trading_day_as_of(d(2024, 1, 8)).unwrap();
        assert_eq!(day.date, d(2024, 1, 5));
    }

    #[test]
    fn empty_window_is_no_data() {
        let acquirer = Acquirer::new(FixedProvider::new(Ok(Vec::new())), "AMD", 7);
        let err = acquirer.fetch_latest_trading_day_as_of(d(2024, 1, 8)).unwrap_err();
        match err {
            AcquireError::NoDataAvailable { symbol, start, end } => {
                assert_eq!(symbol, "AMD");
                assert_eq!(start, d(2024, 1, 1));
                assert_eq!(end, d(2024, 1, 7));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_symbol_is_no_data() {
        let provider = FixedProvider::new(Err(DataError::SymbolNotFound {
            symbol: "NOPE".into(),
        }));
        let acquirer = Acquirer::new(provider, "NOPE", 7);
        assert!(matches!(
            acquirer.fetch_latest_trading_day_as_of(d(2024, 1, 8)),
            Err(AcquireError::NoDataAvailable { .. })
        ));
    }

    #[test]
    fn network_failure_is_fatal_provider_error() {
        let provider = FixedProvider::new(Err(DataError::NetworkUnreachable("timed out".into())));
        let acquirer = Acquirer::new(provider, "AMD", 7);
        assert!(matches!(
            acquirer.fetch_latest_trading_day_as_of(d(2024, 1, 8)),
            Err(AcquireError::Provider(DataError::NetworkUnreachable(_)))
        ));
    }
}
