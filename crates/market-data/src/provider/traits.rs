//! Price provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{AssetDescriptor, AssetSnapshot};

/// Result of a fetch that did not fail.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    /// Fresh data for the asset.
    Fetched(AssetSnapshot),
    /// The asset is not priced by this provider, or has no provider reference.
    /// No request was made; callers treat this as a no-op.
    Unsupported,
}

/// Fetches a complete [`AssetSnapshot`] for one asset from an upstream source.
///
/// Implementations perform no retries: every failure is surfaced to the caller,
/// which owns the retry and back-off policy.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Unique identifier for this provider, used in logs and errors.
    fn id(&self) -> &'static str;

    /// Fetch current price, 24h change and history for `asset`.
    async fn fetch(&self, asset: &AssetDescriptor) -> Result<FetchOutcome, MarketDataError>;
}
