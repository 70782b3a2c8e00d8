use thiserror::Error;

use crate::api_client::ApiError;

/// Failures of the indicator and signal pipeline.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Not enough rows for the trend lookback (or nothing left after pruning).
    #[error("Insufficient data: need at least {required} complete rows, have {available}")]
    InsufficientData { required: usize, available: usize },

    /// The market data fetch failed or returned nothing usable.
    #[error("Market data fetch failed: {0}")]
    UpstreamFetch(#[from] ApiError),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Column {column} has {found} rows, expected {expected}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A column that should be fully defined still holds a gap.
    #[error("Column {column} has an undefined value at row {row}")]
    UndefinedValue { column: String, row: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown index: {0}")]
    UnknownIndex(String),
}
