//! SQLite price store adapter.

use chrono::NaiveDate;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Row, params};

use crate::domain::error::StocklensError;
use crate::domain::price::EnrichedRecord;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_store::{CloseSummary, PriceStore};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_err(e: r2d2::Error) -> StocklensError {
    StocklensError::Database {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> StocklensError {
    StocklensError::DatabaseQuery {
        reason: e.to_string(),
    }
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StocklensError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| StocklensError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, StocklensError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), StocklensError> {
        let conn = self.pool.get().map_err(pool_err)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS prices (
                date TEXT NOT NULL,
                symbol TEXT NOT NULL,
                open REAL,
                high REAL,
                low REAL,
                close REAL,
                volume REAL,
                daily_return REAL,
                ma_7 REAL,
                rolling_252_high REAL,
                rolling_252_low REAL,
                volatility_20d_ann REAL,
                PRIMARY KEY (date, symbol)
            );
            CREATE INDEX IF NOT EXISTS idx_prices_symbol ON prices(symbol);",
        )
        .map_err(query_err)?;

        Ok(())
    }

    fn record_from_row(row: &Row<'_>) -> Result<EnrichedRecord, rusqlite::Error> {
        let date_str: String = row.get(0)?;
        let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                date_str.len(),
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;
        Ok(EnrichedRecord {
            date,
            symbol: row.get(1)?,
            open: row.get(2)?,
            high: row.get(3)?,
            low: row.get(4)?,
            close: row.get(5)?,
            volume: row.get(6)?,
            daily_return: row.get(7)?,
            ma_7: row.get(8)?,
            rolling_252_high: row.get(9)?,
            rolling_252_low: row.get(10)?,
            volatility_20d_ann: row.get(11)?,
        })
    }

    fn collect_records(
        &self,
        query: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<EnrichedRecord>, StocklensError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let mut stmt = conn.prepare(query).map_err(query_err)?;
        let rows = stmt
            .query_map(params, Self::record_from_row)
            .map_err(query_err)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(query_err)?);
        }
        Ok(records)
    }
}

impl PriceStore for SqliteAdapter {
    fn replace_all(&self, records: &[EnrichedRecord]) -> Result<(), StocklensError> {
        let mut conn = self.pool.get().map_err(pool_err)?;
        let tx = conn.transaction().map_err(query_err)?;

        // delete + insert in one transaction: readers never see a half
        // replaced table
        tx.execute("DELETE FROM prices", []).map_err(query_err)?;

        for record in records {
            tx.execute(
                "INSERT INTO prices (date, symbol, open, high, low, close, volume,
                    daily_return, ma_7, rolling_252_high, rolling_252_low, volatility_20d_ann)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    record.date.format(DATE_FORMAT).to_string(),
                    record.symbol,
                    record.open,
                    record.high,
                    record.low,
                    record.close,
                    record.volume,
                    record.daily_return,
                    record.ma_7,
                    record.rolling_252_high,
                    record.rolling_252_low,
                    record.volatility_20d_ann,
                ],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)
    }

    fn latest(&self, symbol: &str, limit: usize) -> Result<Vec<EnrichedRecord>, StocklensError> {
        self.collect_records(
            "SELECT date, symbol, open, high, low, close, volume,
                    daily_return, ma_7, rolling_252_high, rolling_252_low, volatility_20d_ann
             FROM prices WHERE symbol = ?1 ORDER BY date DESC LIMIT ?2",
            params![symbol, limit as i64],
        )
    }

    fn recent_closes(&self, symbol: &str, limit: usize) -> Result<Vec<f64>, StocklensError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let mut stmt = conn
            .prepare(
                "SELECT close FROM prices
                 WHERE symbol = ?1 AND close IS NOT NULL
                 ORDER BY date DESC LIMIT ?2",
            )
            .map_err(query_err)?;
        let rows = stmt
            .query_map(params![symbol, limit as i64], |row| row.get(0))
            .map_err(query_err)?;

        let mut closes = Vec::new();
        for row in rows {
            closes.push(row.map_err(query_err)?);
        }
        Ok(closes)
    }

    fn aggregate(&self, symbol: &str) -> Result<Option<CloseSummary>, StocklensError> {
        let conn = self.pool.get().map_err(pool_err)?;

        let result: (Option<f64>, Option<f64>, Option<f64>) = conn
            .query_row(
                "SELECT MAX(close), MIN(close), AVG(close) FROM prices WHERE symbol = ?1",
                params![symbol],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_err)?;

        match result {
            (Some(high_52), Some(low_52), Some(avg_close)) => Ok(Some(CloseSummary {
                high_52,
                low_52,
                avg_close,
            })),
            _ => Ok(None),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, StocklensError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM prices ORDER BY symbol")
            .map_err(query_err)?;
        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_err)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_err)?);
        }
        Ok(symbols)
    }

    fn preview(&self, limit: usize) -> Result<Vec<EnrichedRecord>, StocklensError> {
        self.collect_records(
            "SELECT date, symbol, open, high, low, close, volume,
                    daily_return, ma_7, rolling_252_high, rolling_252_low, volatility_20d_ann
             FROM prices ORDER BY date DESC, symbol LIMIT ?1",
            params![limit as i64],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct EmptyConfig;

    impl ConfigPort for EmptyConfig {
        fn get_string(&self, _section: &str, _key: &str) -> Option<String> {
            None
        }
        fn get_int(&self, _section: &str, _key: &str, default: i64) -> i64 {
            default
        }
        fn get_double(&self, _section: &str, _key: &str, default: f64) -> f64 {
            default
        }
        fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
            default
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn enriched(symbol: &str, day: u32, close: Option<f64>) -> EnrichedRecord {
        EnrichedRecord {
            symbol: symbol.into(),
            date: date(day),
            open: Some(100.0),
            high: Some(110.0),
            low: Some(90.0),
            close,
            volume: Some(1000.0),
            daily_return: close.map(|c| (c - 100.0) / 100.0),
            ma_7: close,
            rolling_252_high: close,
            rolling_252_low: close,
            volatility_20d_ann: None,
        }
    }

    fn seeded_store(records: &[EnrichedRecord]) -> SqliteAdapter {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();
        adapter.replace_all(records).unwrap();
        adapter
    }

    #[test]
    fn from_config_missing_path() {
        match SqliteAdapter::from_config(&EmptyConfig) {
            Err(StocklensError::ConfigMissing { section, key }) => {
                assert_eq!(section, "sqlite");
                assert_eq!(key, "path");
            }
            Err(other) => panic!("expected ConfigMissing, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn latest_is_newest_first_and_limited() {
        let store = seeded_store(&[
            enriched("TCS", 1, Some(100.0)),
            enriched("TCS", 2, Some(101.0)),
            enriched("TCS", 3, Some(102.0)),
            enriched("HDFC", 3, Some(50.0)),
        ]);

        let rows = store.latest("TCS", 2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date(3));
        assert_eq!(rows[1].date, date(2));
        assert!(rows.iter().all(|r| r.symbol == "TCS"));
    }

    #[test]
    fn latest_round_trips_derived_columns() {
        let mut record = enriched("TCS", 1, Some(105.0));
        record.volatility_20d_ann = Some(0.25);
        let store = seeded_store(&[record]);

        let rows = store.latest("TCS", 10).unwrap();
        assert_relative_eq!(rows[0].daily_return.unwrap(), 0.05, epsilon = 1e-12);
        assert_relative_eq!(rows[0].volatility_20d_ann.unwrap(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn recent_closes_skips_nulls() {
        let store = seeded_store(&[
            enriched("TCS", 1, Some(100.0)),
            enriched("TCS", 2, None),
            enriched("TCS", 3, Some(102.0)),
        ]);

        let closes = store.recent_closes("TCS", 10).unwrap();
        assert_eq!(closes, vec![102.0, 100.0]);
    }

    #[test]
    fn aggregate_over_all_rows() {
        let store = seeded_store(&[
            enriched("TCS", 1, Some(100.0)),
            enriched("TCS", 2, Some(200.0)),
            enriched("TCS", 3, Some(150.0)),
        ]);

        let summary = store.aggregate("TCS").unwrap().unwrap();
        assert_relative_eq!(summary.high_52, 200.0, epsilon = 1e-12);
        assert_relative_eq!(summary.low_52, 100.0, epsilon = 1e-12);
        assert_relative_eq!(summary.avg_close, 150.0, epsilon = 1e-12);
    }

    #[test]
    fn aggregate_unknown_symbol_is_none() {
        let store = seeded_store(&[enriched("TCS", 1, Some(100.0))]);
        assert!(store.aggregate("SBIN").unwrap().is_none());
    }

    #[test]
    fn replace_all_discards_previous_contents() {
        let store = seeded_store(&[
            enriched("TCS", 1, Some(100.0)),
            enriched("HDFC", 1, Some(50.0)),
        ]);

        store
            .replace_all(&[enriched("SBIN", 1, Some(700.0))])
            .unwrap();

        assert_eq!(store.list_symbols().unwrap(), vec!["SBIN"]);
        assert!(store.latest("TCS", 10).unwrap().is_empty());
    }

    #[test]
    fn list_symbols_distinct_ascending() {
        let store = seeded_store(&[
            enriched("TCS", 1, Some(100.0)),
            enriched("TCS", 2, Some(101.0)),
            enriched("HDFC", 1, Some(50.0)),
        ]);
        assert_eq!(store.list_symbols().unwrap(), vec!["HDFC", "TCS"]);
    }

    #[test]
    fn preview_spans_symbols_newest_first() {
        let store = seeded_store(&[
            enriched("TCS", 1, Some(100.0)),
            enriched("TCS", 2, Some(101.0)),
            enriched("HDFC", 2, Some(50.0)),
        ]);

        let rows = store.preview(2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date(2));
        assert_eq!(rows[0].symbol, "HDFC");
        assert_eq!(rows[1].symbol, "TCS");
    }
}
