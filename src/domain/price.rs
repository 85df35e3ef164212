//! Daily price row representations.
//!
//! `PriceRecord` is what a series source yields: one trading day for one
//! symbol, numeric fields explicitly optional because upstream feeds drop
//! values. `EnrichedRecord` adds the derived metric columns; its field names
//! are the persisted column names and part of the storage contract.

use chrono::NaiveDate;

/// One calendar day of raw trading data for one symbol.
///
/// At most one record per `(symbol, date)` pair is expected after
/// normalization; the metrics engine deduplicates last-write-wins if a
/// source violates that.
#[derive(Debug, Clone)]
pub struct PriceRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// A `PriceRecord` augmented with per-symbol trailing-window metrics.
///
/// Derived fields for symbol S at date D depend only on records of S with
/// date <= D.
#[derive(Debug, Clone)]
pub struct EnrichedRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    /// (close - open) / open; None when either side is missing or open is 0.
    pub daily_return: Option<f64>,
    /// Mean close over the trailing 7 records (window shrinks at the start).
    pub ma_7: Option<f64>,
    /// Max close over the trailing 252 records.
    pub rolling_252_high: Option<f64>,
    /// Min close over the trailing 252 records.
    pub rolling_252_low: Option<f64>,
    /// Annualized sample std of daily_return over the trailing 20 records;
    /// None with fewer than 2 non-null returns in the window.
    pub volatility_20d_ann: Option<f64>,
}
