//! Yahoo Finance data provider.
//!
//! Fetches daily bars from Yahoo's v8 chart API with an explicit request
//! timeout and bounded retries with exponential backoff.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; anything the parser does not recognise surfaces as
//! `DataError::ResponseFormatChanged`.

use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use log::{debug, warn};
use serde::Deserialize;

use super::provider::{DailyBar, DataError, MarketDataProvider};
use crate::config::ProviderConfig;

const CHART_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay(),
        })
    }

    /// Build the chart API URL for a symbol and inclusive date range.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        // period2 is exclusive, so run it to the start of the following day.
        let end_ts = (end + chrono::Duration::days(1))
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();
        format!("{CHART_BASE_URL}/{symbol}?period1={start_ts}&period2={end_ts}&interval=1d")
    }

    /// Parse the chart API response into daily bars.
    ///
    /// Rows without both an open and a close (holiday placeholders, the
    /// still-forming bar on some feeds) are skipped. A response with no
    /// timestamps is an empty, valid result.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<DailyBar>, DataError> {
        let result = match (resp.chart.result, resp.chart.error) {
            (Some(result), _) => result,
            (None, Some(err)) if err.code == "Not Found" => {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
            (None, Some(err)) => {
                return Err(DataError::ResponseFormatChanged(format!(
                    "{}: {}",
                    err.code, err.description
                )))
            }
            (None, None) => {
                return Err(DataError::ResponseFormatChanged(
                    "empty result with no error".into(),
                ))
            }
        };

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let gmtoffset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts + gmtoffset, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();

            if let (Some(open), Some(close)) = (open, close) {
                bars.push(DailyBar { date, open, close });
            }
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    /// Execute a single request and classify the HTTP outcome.
    fn fetch_once(&self, symbol: &str, url: &str) -> Result<Vec<DailyBar>, DataError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        check_status(resp.status(), retry_after, symbol)?;

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        Self::parse_response(symbol, chart)
    }

    fn fetch_with_retry(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, DataError> {
        let url = Self::chart_url(symbol, start, end);
        retry_with_backoff(symbol, self.max_retries, self.base_delay, std::thread::sleep, || {
            self.fetch_once(symbol, &url)
        })
    }
}

/// Map a non-success HTTP status to a `DataError`.
///
/// Only 429 and 5xx are transient. A bad symbol comes back as 404 with a
/// chart error body, so 404 falls through to the parser.
fn check_status(
    status: reqwest::StatusCode,
    retry_after: Option<u64>,
    symbol: &str,
) -> Result<(), DataError> {
    use reqwest::StatusCode;

    if status.is_success() || status == StatusCode::NOT_FOUND {
        return Ok(());
    }
    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => DataError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(60),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DataError::AuthenticationRequired(
            format!("Yahoo Finance refused the request (HTTP {status})"),
        ),
        s if s.is_server_error() => DataError::ServerError(format!("HTTP {status} for {symbol}")),
        _ => DataError::Other(format!("HTTP {status} for {symbol}")),
    })
}

/// Run `op`, retrying transient failures up to `max_retries` more times with
/// exponential backoff from `base_delay`.
fn retry_with_backoff<T>(
    symbol: &str,
    max_retries: u32,
    base_delay: Duration,
    mut sleep: impl FnMut(Duration),
    mut op: impl FnMut() -> Result<T, DataError>,
) -> Result<T, DataError> {
    let mut attempt = 0u32;

    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_retries => {
                let delay = base_delay.saturating_mul(2u32.saturating_pow(attempt));
                attempt += 1;
                warn!(
                    "{symbol}: attempt {attempt}/{} failed: {e}; retrying in {delay:?}",
                    max_retries.saturating_add(1)
                );
                sleep(delay);
            }
            Err(e) => return Err(e),
        }
    }
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, DataError> {
        debug!("yahoo_finance: fetching {symbol} {start}..={end}");
        self.fetch_with_retry(symbol, start, end)
    }
}
