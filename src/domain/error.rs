//! Domain error types.

use crate::domain::series::ColumnId;

/// Top-level error type for trendswap.
#[derive(Debug, thiserror::Error)]
pub enum TrendswapError {
    #[error("{transform}: required column {column} is missing")]
    MissingColumn {
        transform: &'static str,
        column: ColumnId,
    },

    #[error("{transform}: column {column} has {actual} rows, store has {expected}")]
    LengthMismatch {
        transform: &'static str,
        column: ColumnId,
        expected: usize,
        actual: usize,
    },

    #[error("{transform}: series store is empty")]
    EmptySeries { transform: &'static str },

    #[error("column {column} is already present in the store")]
    DuplicateColumn { column: ColumnId },

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

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("bar at row {row} is not after the previous bar")]
    UnorderedBars { row: usize },

    #[error("event aggregator failed: {reason}")]
    Aggregator { reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrendswapError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TrendswapError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TrendswapError> for std::process::ExitCode {
    fn from(err: &TrendswapError) -> Self {
        let code: u8 = match err {
            TrendswapError::Io(_) => 1,
            TrendswapError::ConfigParse { .. }
            | TrendswapError::ConfigMissing { .. }
            | TrendswapError::ConfigInvalid { .. } => 2,
            TrendswapError::Data { .. }
            | TrendswapError::UnorderedBars { .. }
            | TrendswapError::Csv(_) => 3,
            TrendswapError::MissingColumn { .. }
            | TrendswapError::LengthMismatch { .. }
            | TrendswapError::EmptySeries { .. }
            | TrendswapError::DuplicateColumn { .. } => 4,
            TrendswapError::Aggregator { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
