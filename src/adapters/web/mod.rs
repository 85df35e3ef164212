//! Web server adapter.
//!
//! Axum JSON API over the price store: known symbols, recent rows, close
//! aggregates, and the next-close forecast. CORS is wide open and static
//! files are mounted last so API routes always win.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::*;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::ports::price_store::PriceStore;

pub struct AppState {
    pub store: Arc<dyn PriceStore + Send + Sync>,
    /// Configured symbol universe; when empty, /companies falls back to the
    /// symbols present in the store.
    pub symbols: Vec<String>,
}

pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/companies", get(handlers::companies))
        .route("/data/{symbol}", get(handlers::data))
        .route("/summary/{symbol}", get(handlers::summary))
        .route("/predict/{symbol}", get(handlers::predict))
        .with_state(Arc::new(state))
        .layer(cors);

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
}
