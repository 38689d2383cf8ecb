//! Error types.
//!
//! - `AnalyticsError`: failures of the numeric core (weights, aggregation, stats, simulation)
//! - `ProviderError`: failures to retrieve a price series
//! - `AppError`: what the binary reports, carrying a process exit code

use thiserror::Error;

/// Exit code for invalid usage, input or configuration.
pub const EXIT_INPUT: u8 = 2;
/// Exit code when no usable data remains.
pub const EXIT_NO_DATA: u8 = 3;
/// Exit code for runtime failures (network, IO, terminal output).
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("dimension mismatch: expected {expected} weights, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("weight total is zero; cannot normalize")]
    DivisionByZero,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request for {ticker} failed: {message}")]
    Request { ticker: String, message: String },

    #[error("no price data for {0}")]
    NotFound(String),

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("malformed data for {ticker}: {message}")]
    Malformed { ticker: String, message: String },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        let exit_code = match err {
            AnalyticsError::InsufficientData(_) => EXIT_NO_DATA,
            _ => EXIT_INPUT,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::new(EXIT_RUNTIME, err.to_string())
    }
}
