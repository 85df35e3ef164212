//! CLI definition and dispatch.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::mock_adapter::MockAdapter;
use crate::adapters::sqlite_adapter::SqliteAdapter;
use crate::domain::error::StocklensError;
use crate::domain::forecast::{FORECAST_LOOKBACK, MIN_FORECAST_POINTS, predict_next_close};
use crate::domain::metrics;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_store::PriceStore;
use crate::ports::series_source::SeriesSource;

/// Rows printed after a successful ingest.
const PREVIEW_ROWS: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "stocklens", about = "Daily stock metrics pipeline and API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch price history, compute metrics, and replace the stored table
    Ingest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override the configured symbol list
        #[arg(long, num_args = 1..)]
        symbols: Vec<String>,
    },
    /// Start the HTTP API server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols present in the store
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Predict the next close for a symbol from stored history
    Predict {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Ingest { config, symbols } => run_ingest(&config, &symbols),
        Command::Serve { config } => run_serve(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Predict { config, symbol } => run_predict(&config, &symbol),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = StocklensError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Symbols from `[data] symbols`, comma separated, uppercased.
pub fn configured_symbols(config: &dyn ConfigPort) -> Vec<String> {
    config
        .get_string("data", "symbols")
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Build the configured series source: `[data] source = csv | mock`.
fn build_source(config: &dyn ConfigPort) -> Result<Box<dyn SeriesSource>, StocklensError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());

    match source.as_str() {
        "csv" => {
            let dir = config
                .get_string("data", "csv_dir")
                .unwrap_or_else(|| "data".to_string());
            Ok(Box::new(CsvAdapter::new(PathBuf::from(dir))))
        }
        "mock" => {
            let days = config.get_int("data", "mock_days", 200).max(0) as u32;
            let end = match config.get_string("data", "mock_end") {
                Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
                    StocklensError::ConfigInvalid {
                        section: "data".into(),
                        key: "mock_end".into(),
                        reason: e.to_string(),
                    }
                })?,
                None => chrono::Utc::now().date_naive(),
            };
            Ok(Box::new(MockAdapter::new(days, end)))
        }
        other => Err(StocklensError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown source {other:?}, expected csv or mock"),
        }),
    }
}

fn open_store(config: &dyn ConfigPort) -> Result<SqliteAdapter, StocklensError> {
    let store = SqliteAdapter::from_config(config)?;
    store.initialize_schema()?;
    Ok(store)
}

fn run_ingest(config_path: &PathBuf, symbols_override: &[String]) -> ExitCode {
    // Stage 1: config
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let symbols = if symbols_override.is_empty() {
        configured_symbols(&config)
    } else {
        symbols_override
            .iter()
            .map(|s| s.trim().to_uppercase())
            .collect()
    };
    if symbols.is_empty() {
        let err = StocklensError::ConfigMissing {
            section: "data".into(),
            key: "symbols".into(),
        };
        eprintln!("error: {err}");
        return ExitCode::from(&err);
    }

    // Stage 2: source and store
    let source = match build_source(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    // Stage 3: fetch
    let mut batch = Vec::new();
    for symbol in &symbols {
        eprintln!("Fetching {symbol}...");
        match source.fetch_history(symbol) {
            Ok(history) if history.is_empty() => {
                eprintln!("warning: no data for {symbol}");
            }
            Ok(mut history) => batch.append(&mut history),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        }
    }
    if batch.is_empty() {
        let err = StocklensError::NoData {
            symbol: symbols.join(","),
        };
        eprintln!("error: {err}");
        return ExitCode::from(&err);
    }

    // Stage 4: compute and store
    let enriched = metrics::compute(batch);
    eprintln!("Computed metrics for {} rows", enriched.len());
    if let Err(e) = store.replace_all(&enriched) {
        eprintln!("error: {e}");
        return ExitCode::from(&e);
    }
    eprintln!("Stored {} rows", enriched.len());

    // Stage 5: preview
    match store.preview(PREVIEW_ROWS) {
        Ok(rows) => {
            for row in rows {
                println!(
                    "{} {} close={} ma_7={} vol={}",
                    row.date,
                    row.symbol,
                    fmt_opt(row.close),
                    fmt_opt(row.ma_7),
                    fmt_opt(row.volatility_20d_ann),
                );
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    }

    ExitCode::SUCCESS
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "null".to_string(),
    }
}

fn run_serve(config_path: &PathBuf) -> ExitCode {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use crate::adapters::web::{AppState, build_router};

    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let store = match open_store(&config) {
        Ok(s) => Arc::new(s) as Arc<dyn PriceStore + Send + Sync>,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let addr: SocketAddr = match config
        .get_string("web", "listen")
        .unwrap_or_else(|| "127.0.0.1:8000".to_string())
        .parse()
    {
        Ok(a) => a,
        Err(e) => {
            let err = StocklensError::ConfigInvalid {
                section: "web".into(),
                key: "listen".into(),
                reason: e.to_string(),
            };
            eprintln!("error: {err}");
            return ExitCode::from(&err);
        }
    };

    let static_dir = config
        .get_string("web", "static_dir")
        .unwrap_or_else(|| "static".to_string());

    let state = AppState {
        store,
        symbols: configured_symbols(&config),
    };
    let router = build_router(state, Some(PathBuf::from(static_dir)));

    eprintln!("Starting web server on {addr}");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    };
    let served = runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await
    });
    if let Err(e) = served {
        eprintln!("error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let store = match open_store(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    match store.list_symbols() {
        Ok(symbols) => {
            for symbol in symbols {
                println!("{symbol}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_predict(config_path: &PathBuf, symbol: &str) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let symbol = symbol.trim().to_uppercase();

    let store = match open_store(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let mut closes = match store.recent_closes(&symbol, FORECAST_LOOKBACK) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };
    closes.reverse();

    match predict_next_close(&closes) {
        Some(predicted) => {
            println!("{symbol}: predicted next close {predicted:.2}");
            ExitCode::SUCCESS
        }
        None => {
            let err = StocklensError::InsufficientData {
                symbol,
                have: closes.len(),
                minimum: MIN_FORECAST_POINTS,
            };
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}
