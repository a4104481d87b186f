//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum for every upstream fetch failure
//! - [`FailureClass`]: How the polling scheduler should react to an error

mod failure;

pub use failure::FailureClass;

use thiserror::Error;

/// Type alias for Result using [`MarketDataError`].
pub type Result<T> = std::result::Result<T, MarketDataError>;

/// Errors that can occur while fetching data from an upstream provider.
///
/// Each variant is classified into a [`FailureClass`] via the
/// [`failure_class`](Self::failure_class) method. Rate limiting has its own
/// variant, produced directly from the HTTP status, so callers never have to
/// inspect error text to detect it.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The provider answered with a non-success HTTP status other than 429.
    #[error("HTTP {status} from {provider}")]
    HttpStatus {
        /// The provider that returned the status
        provider: String,
        /// The HTTP status code
        status: u16,
    },

    /// The response body did not have the expected JSON shape.
    #[error("Malformed payload from {provider}: {message}")]
    MalformedPayload {
        /// The provider that returned the payload
        provider: String,
        /// What was missing or unexpected
        message: String,
    },

    /// The request never produced a usable response (connect, timeout, body read).
    #[error("Transport failure talking to {provider}: {message}")]
    Transport {
        /// The provider that could not be reached
        provider: String,
        /// The underlying transport error
        message: String,
    },
}

impl MarketDataError {
    /// Returns how the polling scheduler should react to this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricewatch_market_data::errors::{FailureClass, MarketDataError};
    ///
    /// let error = MarketDataError::RateLimited { provider: "COINGECKO".to_string() };
    /// assert_eq!(error.failure_class(), FailureClass::BackOff);
    ///
    /// let error = MarketDataError::HttpStatus { provider: "COINGECKO".to_string(), status: 500 };
    /// assert_eq!(error.failure_class(), FailureClass::Continue);
    /// ```
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::RateLimited { .. } => FailureClass::BackOff,
            Self::HttpStatus { .. } | Self::MalformedPayload { .. } | Self::Transport { .. } => {
                FailureClass::Continue
            }
        }
    }

    /// True if the provider signalled rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}
