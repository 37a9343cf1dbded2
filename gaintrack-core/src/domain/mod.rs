//! Domain types: the acquired trading day and the ledger row built from it.

pub mod record;

pub use record::{round2, TrackingRecord, TradingDay};
