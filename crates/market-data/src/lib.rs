//! Pricewatch Market Data Crate
//!
//! Upstream price fetching for the small, fixed set of assets Pricewatch
//! tracks.
//!
//! # Overview
//!
//! - [`AssetRegistry`] - the ordered list of tracked assets
//! - [`PriceFetcher`] - one asset in, one [`AssetSnapshot`] out
//! - [`CoinGeckoProvider`] - the CoinGecko implementation (price + 1 day history)
//! - [`MarketDataError`] - structured failures, including an explicit rate-limit variant
//!
//! # Flow
//!
//! ```text
//! AssetDescriptor --> PriceFetcher::fetch --> /simple/price
//!                                         --> (pause)
//!                                         --> /coins/{id}/market_chart
//!                                         --> AssetSnapshot
//! ```

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use errors::{FailureClass, MarketDataError};
pub use models::{AssetCategory, AssetDescriptor, AssetSnapshot, HistoryPoint, ProviderKind};
pub use provider::coingecko::{CoinGeckoConfig, CoinGeckoProvider};
pub use provider::{FetchOutcome, PriceFetcher};
pub use registry::{AssetRegistry, RegistryError};
