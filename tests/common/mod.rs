//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use chrono::NaiveDate;
use stocklens::domain::error::StocklensError;
use stocklens::domain::price::{EnrichedRecord, PriceRecord};
use stocklens::ports::price_store::{CloseSummary, PriceStore};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily records with the given closes, one per day from `start`.
pub fn make_series(symbol: &str, start: NaiveDate, closes: &[f64]) -> Vec<PriceRecord> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceRecord {
            symbol: symbol.to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: Some(close),
            high: Some(close + 1.0),
            low: Some(close - 1.0),
            close: Some(close),
            volume: Some(10_000.0),
        })
        .collect()
}

pub fn make_enriched(symbol: &str, day: NaiveDate, close: Option<f64>) -> EnrichedRecord {
    EnrichedRecord {
        symbol: symbol.to_string(),
        date: day,
        open: Some(100.0),
        high: Some(110.0),
        low: Some(90.0),
        close,
        volume: Some(10_000.0),
        daily_return: None,
        ma_7: close,
        rolling_252_high: close,
        rolling_252_low: close,
        volatility_20d_ann: None,
    }
}

/// In-memory price store for tests that don't need SQLite.
pub struct MemoryStore {
    rows: Mutex<Vec<EnrichedRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn with_rows(rows: Vec<EnrichedRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

impl PriceStore for MemoryStore {
    fn replace_all(&self, records: &[EnrichedRecord]) -> Result<(), StocklensError> {
        *self.rows.lock().unwrap() = records.to_vec();
        Ok(())
    }

    fn latest(&self, symbol: &str, limit: usize) -> Result<Vec<EnrichedRecord>, StocklensError> {
        let mut rows: Vec<EnrichedRecord> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.symbol == symbol)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows.truncate(limit);
        Ok(rows)
    }

    fn recent_closes(&self, symbol: &str, limit: usize) -> Result<Vec<f64>, StocklensError> {
        Ok(self
            .latest(symbol, usize::MAX)?
            .into_iter()
            .filter_map(|r| r.close)
            .take(limit)
            .collect())
    }

    fn aggregate(&self, symbol: &str) -> Result<Option<CloseSummary>, StocklensError> {
        let closes: Vec<f64> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.symbol == symbol)
            .filter_map(|r| r.close)
            .collect();
        if closes.is_empty() {
            return Ok(None);
        }
        Ok(Some(CloseSummary {
            high_52: closes.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            low_52: closes.iter().cloned().fold(f64::INFINITY, f64::min),
            avg_close: closes.iter().sum::<f64>() / closes.len() as f64,
        }))
    }

    fn list_symbols(&self) -> Result<Vec<String>, StocklensError> {
        let mut symbols: Vec<String> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.symbol.clone())
            .collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }

    fn preview(&self, limit: usize) -> Result<Vec<EnrichedRecord>, StocklensError> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(a.symbol.cmp(&b.symbol)));
        rows.truncate(limit);
        Ok(rows)
    }
}
