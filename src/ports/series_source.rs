//! Price history source port trait.

use crate::domain::error::StocklensError;
use crate::domain::price::PriceRecord;

/// A source of raw daily price records (CSV files, mock generator, ...).
///
/// Records may come back in any order and with missing numeric fields; the
/// metrics engine normalizes ordering itself. An unknown symbol yields an
/// error, a known symbol with no history yields an empty vec.
pub trait SeriesSource {
    fn fetch_history(&self, symbol: &str) -> Result<Vec<PriceRecord>, StocklensError>;
}
