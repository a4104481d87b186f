//! Core error types for Pricewatch.

use thiserror::Error;

use pricewatch_market_data::{MarketDataError, RegistryError};

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Invalid asset registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),
}
