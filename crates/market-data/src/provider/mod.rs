//! Price provider abstractions and implementations.
//!
//! This module contains:
//! - The `PriceFetcher` trait that the polling scheduler drives
//! - The CoinGecko implementation

mod traits;

pub mod coingecko;

pub use traits::{FetchOutcome, PriceFetcher};
