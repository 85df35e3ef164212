//! Domain error types.

/// Top-level error type for stocklens.
///
/// Missing fields and zero opens inside the metrics engine resolve locally
/// to null columns and never surface here; these variants cover the I/O
/// boundary (config, source, store) and insufficient-history queries.
#[derive(Debug, thiserror::Error)]
pub enum StocklensError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("source error for {symbol}: {reason}")]
    Source { symbol: String, reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {have} closes, need {minimum}")]
    InsufficientData {
        symbol: String,
        have: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StocklensError> for std::process::ExitCode {
    fn from(err: &StocklensError) -> Self {
        let code: u8 = match err {
            StocklensError::Io(_) => 1,
            StocklensError::ConfigParse { .. }
            | StocklensError::ConfigMissing { .. }
            | StocklensError::ConfigInvalid { .. } => 2,
            StocklensError::Database { .. } | StocklensError::DatabaseQuery { .. } => 3,
            StocklensError::Source { .. } => 4,
            StocklensError::NoData { .. } | StocklensError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
