//! Error types for the ev_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the ev_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Fewer historical points than the lag features require
    #[error("Insufficient history: need at least {needed} data points, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    /// Forecast horizon outside the accepted range
    #[error("Invalid horizon: {0}")]
    InvalidHorizon(String),

    /// The predictor call failed or returned a non-finite value
    #[error("Predictor failure: {0}")]
    PredictorFailure(String),

    /// Region name not present in the dataset
    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
