//! Metrics engine: per-symbol trailing-window statistics.
//!
//! Pure transform from raw price records to enriched records. Input may be
//! unsorted and may mix symbols; each symbol is processed independently over
//! its own date-ascending sequence. All windows are trailing (never centered,
//! never looking ahead) and shrink at the start of history. Null fields are
//! excluded from aggregation rather than poisoning a window.

use std::collections::BTreeMap;

use crate::domain::price::{EnrichedRecord, PriceRecord};

pub const MA_WINDOW: usize = 7;
pub const RANGE_WINDOW: usize = 252;
pub const VOLATILITY_WINDOW: usize = 20;
/// A sample standard deviation needs at least two observations.
pub const MIN_VOLATILITY_SAMPLES: usize = 2;
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Compute the derived columns for every record in the batch.
///
/// Records are partitioned by symbol, stably sorted ascending by date
/// (source order is the tiebreak), and deduplicated last-write-wins on equal
/// `(symbol, date)` keys. Output is date-ascending within each symbol and
/// symbols appear in ascending order, so identical inputs in any order
/// produce identical output.
pub fn compute(records: Vec<PriceRecord>) -> Vec<EnrichedRecord> {
    let mut by_symbol: BTreeMap<String, Vec<PriceRecord>> = BTreeMap::new();
    for record in records {
        by_symbol
            .entry(record.symbol.clone())
            .or_default()
            .push(record);
    }

    let mut enriched = Vec::new();
    for (_, mut partition) in by_symbol {
        partition.sort_by_key(|r| r.date);
        let partition = dedupe_last_write_wins(partition);
        enrich_partition(&partition, &mut enriched);
    }
    enriched
}

/// Duplicate `(symbol, date)` keys are a loader contract violation; when they
/// occur anyway the record latest in source order wins. The sort above is
/// stable, so within a run of equal dates the last element is that record.
fn dedupe_last_write_wins(partition: Vec<PriceRecord>) -> Vec<PriceRecord> {
    let mut kept: Vec<PriceRecord> = Vec::with_capacity(partition.len());
    for record in partition {
        match kept.last_mut() {
            Some(prev) if prev.date == record.date => *prev = record,
            _ => kept.push(record),
        }
    }
    kept
}

fn enrich_partition(partition: &[PriceRecord], out: &mut Vec<EnrichedRecord>) {
    let returns: Vec<Option<f64>> = partition.iter().map(daily_return).collect();

    for (i, record) in partition.iter().enumerate() {
        out.push(EnrichedRecord {
            symbol: record.symbol.clone(),
            date: record.date,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
            daily_return: returns[i],
            ma_7: close_mean(partition, i, MA_WINDOW),
            rolling_252_high: close_extreme(partition, i, RANGE_WINDOW, f64::max),
            rolling_252_low: close_extreme(partition, i, RANGE_WINDOW, f64::min),
            volatility_20d_ann: annualized_volatility(&returns, i),
        });
    }
}

fn daily_return(record: &PriceRecord) -> Option<f64> {
    match (record.open, record.close) {
        (Some(open), Some(close)) if open != 0.0 => Some((close - open) / open),
        _ => None,
    }
}

/// Start index of the trailing window of size `window` ending at `i`.
fn window_start(i: usize, window: usize) -> usize {
    (i + 1).saturating_sub(window)
}

fn valid_closes(
    partition: &[PriceRecord],
    i: usize,
    window: usize,
) -> impl Iterator<Item = f64> + '_ {
    partition[window_start(i, window)..=i]
        .iter()
        .filter_map(|r| r.close)
}

fn close_mean(partition: &[PriceRecord], i: usize, window: usize) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for close in valid_closes(partition, i, window) {
        sum += close;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

fn close_extreme(
    partition: &[PriceRecord],
    i: usize,
    window: usize,
    pick: fn(f64, f64) -> f64,
) -> Option<f64> {
    valid_closes(partition, i, window).reduce(pick)
}

/// Sample standard deviation (ddof = 1) of the non-null returns in the
/// trailing 20-row window, scaled by sqrt(252).
fn annualized_volatility(returns: &[Option<f64>], i: usize) -> Option<f64> {
    let window: Vec<f64> = returns[window_start(i, VOLATILITY_WINDOW)..=i]
        .iter()
        .copied()
        .flatten()
        .collect();

    if window.len() < MIN_VOLATILITY_SAMPLES {
        return None;
    }

    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window
        .iter()
        .map(|r| {
            let diff = r - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);

    Some(variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt())
}
