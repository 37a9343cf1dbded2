//! Market data provider trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over the quote source so the
//! acquirer can be driven by Yahoo Finance in production and by a fixed bar
//! list in tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One daily bar as returned by a provider: the calendar date with its
/// opening and closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

/// Structured error types for provider operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider server error: {0}")]
    ServerError(String),

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Whether another attempt at the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DataError::NetworkUnreachable(_)
                | DataError::RateLimited { .. }
                | DataError::ServerError(_)
        )
    }
}

/// Source of daily open/close bars.
///
/// Implementations return bars in chronological order. An empty vector means
/// the provider had no trading activity for the range; it is not an error.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over an inclusive date range.
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, DataError>;
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for Box<P> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(DataError::NetworkUnreachable("timeout".into()).is_transient());
        assert!(DataError::RateLimited { retry_after_secs: 5 }.is_transient());
        assert!(!DataError::SymbolNotFound { symbol: "XYZ".into() }.is_transient());
        assert!(!DataError::AuthenticationRequired("401".into()).is_transient());
        assert!(DataError::ServerError("HTTP 503".into()).is_transient());
        assert!(!DataError::ResponseFormatChanged("bad json".into()).is_transient());
        assert!(!DataError::Other("HTTP 400 Bad Request".into()).is_transient());
    }

    #[test]
    fn error_messages_are_readable() {
        let err = DataError::SymbolNotFound { symbol: "ZZZZ".into() };
        assert_eq!(err.to_string(), "symbol not found: ZZZZ");
    }
}
