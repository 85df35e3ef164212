//! HTTP request handlers for the web adapter.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use crate::domain::forecast::{FORECAST_LOOKBACK, predict_next_close};
use crate::domain::price::EnrichedRecord;
use crate::ports::price_store::CloseSummary;

use super::{ApiError, AppState};

/// How many raw rows /data returns at most.
pub const DATA_ROW_LIMIT: usize = 200;

/// Raw projection of a stored row; derived columns stay server-side.
#[derive(Debug, Serialize)]
pub struct RawRow {
    pub date: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl From<&EnrichedRecord> for RawRow {
    fn from(record: &EnrichedRecord) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Predicted { predicted_next_close: f64 },
    Error { error: String },
}

pub async fn companies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    if !state.symbols.is_empty() {
        return Ok(Json(state.symbols.clone()));
    }
    Ok(Json(state.store.list_symbols()?))
}

pub async fn data(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<Vec<RawRow>>, ApiError> {
    let rows = state.store.latest(&symbol, DATA_ROW_LIMIT)?;
    Ok(Json(rows.iter().map(RawRow::from).collect()))
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<CloseSummary>, ApiError> {
    match state.store.aggregate(&symbol)? {
        Some(summary) => Ok(Json(summary)),
        None => Err(ApiError::not_found(format!("no data for {symbol}"))),
    }
}

/// Insufficient history is data to the caller, not a failure: the original
/// contract is a 200 with an error body.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut closes = state.store.recent_closes(&symbol, FORECAST_LOOKBACK)?;
    // store yields newest first; the fit wants chronological order
    closes.reverse();

    let response = match predict_next_close(&closes) {
        Some(predicted_next_close) => PredictResponse::Predicted {
            predicted_next_close,
        },
        None => PredictResponse::Error {
            error: "Not enough data".to_string(),
        },
    };
    Ok(Json(response))
}
