//! CSV file series source adapter.
//!
//! Reads `<dir>/<SYMBOL>.csv` with header `date,open,high,low,close,volume`.
//! Empty numeric cells become None; malformed dates or numbers are errors.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::error::StocklensError;
use crate::domain::price::PriceRecord;
use crate::ports::series_source::SeriesSource;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn source_err(symbol: &str, reason: impl Into<String>) -> StocklensError {
    StocklensError::Source {
        symbol: symbol.to_string(),
        reason: reason.into(),
    }
}

fn optional_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    symbol: &str,
) -> Result<Option<f64>, StocklensError> {
    match record.get(index).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| source_err(symbol, format!("invalid {} value {:?}: {}", name, raw, e))),
    }
}

impl SeriesSource for CsvAdapter {
    fn fetch_history(&self, symbol: &str) -> Result<Vec<PriceRecord>, StocklensError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path)
            .map_err(|e| source_err(symbol, format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut records = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| source_err(symbol, format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| source_err(symbol, "missing date column"))?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| source_err(symbol, format!("invalid date {:?}: {}", date_str, e)))?;

            records.push(PriceRecord {
                symbol: symbol.to_string(),
                date,
                open: optional_field(&record, 1, "open", symbol)?,
                high: optional_field(&record, 2, "high", symbol)?,
                low: optional_field(&record, 3, "low", symbol)?,
                close: optional_field(&record, 4, "close", symbol)?,
                volume: optional_field(&record, 5, "volume", symbol)?,
            });
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,,60000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n";

        fs::write(path.join("TCS.csv"), csv_content).unwrap();
        fs::write(
            path.join("HDFC.csv"),
            "date,open,high,low,close,volume\n2024-01-15,not_a_number,2,3,4,5\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_history_parses_rows() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let records = adapter.fetch_history("TCS").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(records[0].symbol, "TCS");
        assert_eq!(records[0].open, Some(100.0));
        assert_eq!(records[0].close, Some(105.0));
        assert_eq!(records[0].volume, Some(50000.0));
    }

    #[test]
    fn empty_cell_becomes_none() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let records = adapter.fetch_history("TCS").unwrap();
        assert_eq!(records[1].close, None);
        assert_eq!(records[1].open, Some(105.0));
    }

    #[test]
    fn missing_file_is_a_source_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        match adapter.fetch_history("SBIN") {
            Err(StocklensError::Source { symbol, .. }) => assert_eq!(symbol, "SBIN"),
            other => panic!("expected Source error, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn malformed_number_is_a_source_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.fetch_history("HDFC");
        assert!(matches!(result, Err(StocklensError::Source { .. })));
    }
}
