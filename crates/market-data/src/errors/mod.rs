//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`GatewayError`]: The error enum for all gateway operations
//! - [`RetryClass`]: Classification for determining retry behavior
//! - [`RetryExhausted`]: The last failure of an operation whose retry budget ran out

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Status code the gateway uses for an internal service fault.
pub const INTERNAL_FAULT_CODE: i32 = 13;

/// Errors that can occur while talking to the market-data gateway.
///
/// Each variant is classified into a [`RetryClass`] via the
/// [`retry_class`](Self::retry_class) method.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The gateway reported an internal service fault (code 13).
    #[error("Internal gateway fault: {message}")]
    Internal {
        /// Message attached by the gateway
        message: String,
    },

    /// The gateway rejected the call with a status code other than 13.
    #[error("Gateway error {code}: {message}")]
    Api {
        /// Status code reported by the gateway
        code: i32,
        /// Message attached by the gateway
        message: String,
    },

    /// The access token was missing, expired or lacked permissions.
    #[error("Unauthorized: invalid or missing access token")]
    Unauthorized,

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The session was closed before the call was made.
    #[error("Gateway session is closed")]
    Closed,

    /// The response body did not have the expected shape.
    #[error("Malformed response from {endpoint}: {message}")]
    Malformed {
        /// Gateway method that produced the response
        endpoint: String,
        /// Decoder message
        message: String,
    },
}

impl GatewayError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use bondscope_market_data::errors::{GatewayError, RetryClass};
    ///
    /// let error = GatewayError::Internal { message: "overloaded".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::InternalFault);
    ///
    /// let error = GatewayError::Unauthorized;
    /// assert_eq!(error.retry_class(), RetryClass::Transient);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Internal { .. } => RetryClass::InternalFault,
            Self::Api { code, .. } if *code == INTERNAL_FAULT_CODE => RetryClass::InternalFault,
            Self::Api { .. }
            | Self::Unauthorized
            | Self::Closed
            | Self::Transport(_)
            | Self::Malformed { .. } => RetryClass::Transient,
        }
    }

    /// Builds the error for a gateway status code, folding code 13 into
    /// [`GatewayError::Internal`].
    pub fn from_code(code: i32, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == INTERNAL_FAULT_CODE {
            Self::Internal { message }
        } else {
            Self::Api { code, message }
        }
    }
}

/// An operation failed on every attempt of its retry budget.
#[derive(Error, Debug)]
#[error("{operation} failed after {attempts} attempt(s): {source}")]
pub struct RetryExhausted<E>
where
    E: std::error::Error + 'static,
{
    /// Name of the operation, for diagnostics
    pub operation: String,
    /// Number of attempts made
    pub attempts: u32,
    /// Error returned by the final attempt
    #[source]
    pub source: E,
}
