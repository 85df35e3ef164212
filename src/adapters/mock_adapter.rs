//! Mock series source: seeded per-symbol random walk.
//!
//! Stand-in for a live feed during development and demos. The seed is
//! derived from the symbol name, so the same symbol always produces the
//! same history.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::error::StocklensError;
use crate::domain::price::PriceRecord;
use crate::ports::series_source::SeriesSource;

pub struct MockAdapter {
    days: u32,
    end: NaiveDate,
}

impl MockAdapter {
    pub fn new(days: u32, end: NaiveDate) -> Self {
        Self { days, end }
    }
}

fn symbol_seed(symbol: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    symbol.hash(&mut hasher);
    hasher.finish()
}

impl SeriesSource for MockAdapter {
    fn fetch_history(&self, symbol: &str) -> Result<Vec<PriceRecord>, StocklensError> {
        let mut rng = StdRng::seed_from_u64(symbol_seed(symbol));
        let base: f64 = rng.gen_range(100.0..4000.0);

        let mut close = base;
        let mut records = Vec::with_capacity(self.days as usize);
        for offset in (0..self.days).rev() {
            let date = self.end - Duration::days(i64::from(offset));
            close += rng.gen_range(-1.0..1.0) * base * 0.002;
            let open = close + rng.gen_range(-1.0..1.0) * base * 0.001;
            let high = open.max(close) + rng.gen_range(0.0..base * 0.003);
            let low = open.min(close) - rng.gen_range(0.0..base * 0.003);
            let volume = rng.gen_range(800_000..3_000_000) as f64;

            records.push(PriceRecord {
                symbol: symbol.to_string(),
                date,
                open: Some(open),
                high: Some(high),
                low: Some(low),
                close: Some(close),
                volume: Some(volume),
            });
        }

        Ok(records)
    }
}
