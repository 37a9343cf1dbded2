//! Market data acquisition from external providers.

pub mod provider;
pub mod yahoo;

pub use provider::{DailyBar, DataError, MarketDataProvider};
pub use yahoo::YahooProvider;
