//! Core error types for the bond screener.

use bondscope_market_data::{GatewayError, RetryExhausted};
use bondscope_ratings::RatingError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the screener.
#[derive(Error, Debug)]
pub enum Error {
    /// A gateway call failed on every attempt.
    #[error("Gateway call failed: {0}")]
    Gateway(#[from] RetryExhausted<GatewayError>),

    /// A rating source could not be set up.
    #[error("Rating source error: {0}")]
    Rating(#[from] RatingError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to write report: {0}")]
    Output(String),
}
