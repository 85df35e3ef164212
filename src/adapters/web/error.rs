//! HTTP error responses for the web adapter.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::error::StocklensError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<StocklensError> for ApiError {
    fn from(err: StocklensError) -> Self {
        let status = match &err {
            StocklensError::ConfigMissing { .. }
            | StocklensError::ConfigInvalid { .. }
            | StocklensError::ConfigParse { .. } => StatusCode::BAD_REQUEST,
            StocklensError::NoData { .. } | StocklensError::InsufficientData { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            StocklensError::Source { .. }
            | StocklensError::Database { .. }
            | StocklensError::DatabaseQuery { .. }
            | StocklensError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
