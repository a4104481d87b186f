use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pricewatch_core::CacheEntry;
use pricewatch_market_data::AssetSnapshot;
use serde::Serialize;

/// Body of a successful price lookup: the snapshot plus its freshness.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    #[serde(flatten)]
    pub snapshot: Arc<AssetSnapshot>,
    pub fetched_at: DateTime<Utc>,
    pub stale: bool,
}

impl PriceResponse {
    pub fn from_entry(entry: &CacheEntry, stale_after: Duration) -> Self {
        Self {
            snapshot: Arc::clone(entry.snapshot()),
            fetched_at: entry.fetched_at(),
            stale: entry.is_stale(stale_after),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingStatus {
    pub polling: bool,
    pub tracked_assets: usize,
}
