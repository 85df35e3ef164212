//! Enriched price store port trait.

use serde::Serialize;

use crate::domain::error::StocklensError;
use crate::domain::price::EnrichedRecord;

/// Whole-history close aggregates for one symbol.
///
/// Field names follow the persisted/API contract: `high_52` and `low_52` are
/// the max/min close over all stored rows, `avg_close` their mean.
#[derive(Debug, Clone, Serialize)]
pub struct CloseSummary {
    pub high_52: f64,
    pub low_52: f64,
    pub avg_close: f64,
}

/// Persistence gateway for enriched rows, keyed by `(date, symbol)`.
///
/// Writes replace the full table each run; reads are thin projections with
/// no derived logic.
pub trait PriceStore {
    /// Atomically replace all stored rows with `records`.
    fn replace_all(&self, records: &[EnrichedRecord]) -> Result<(), StocklensError>;

    /// Up to `limit` most recent rows for `symbol`, newest first.
    fn latest(&self, symbol: &str, limit: usize) -> Result<Vec<EnrichedRecord>, StocklensError>;

    /// Up to `limit` most recent non-null closes for `symbol`, newest first.
    /// Forecast callers reverse this into chronological order before fitting.
    fn recent_closes(&self, symbol: &str, limit: usize) -> Result<Vec<f64>, StocklensError>;

    /// Close aggregates over all stored rows for `symbol`; None when the
    /// symbol has no rows with a close.
    fn aggregate(&self, symbol: &str) -> Result<Option<CloseSummary>, StocklensError>;

    /// Distinct stored symbols, ascending.
    fn list_symbols(&self) -> Result<Vec<String>, StocklensError>;

    /// Up to `limit` most recent rows across all symbols, newest first then
    /// symbol ascending. Used for the post-ingest preview.
    fn preview(&self, limit: usize) -> Result<Vec<EnrichedRecord>, StocklensError>;
}
