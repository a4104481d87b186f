//! CoinGecko API response structures.

use std::collections::HashMap;

use serde::Deserialize;

/// Response from /simple/price, keyed by coin id.
pub(super) type SimplePriceResponse = HashMap<String, SimplePriceEntry>;

/// Price entry for one coin in /simple/price
#[derive(Debug, Deserialize)]
pub(super) struct SimplePriceEntry {
    /// Price in USD
    pub usd: Option<f64>,
    /// 24h change in percent, only present with include_24hr_change=true
    pub usd_24h_change: Option<f64>,
}

/// Response from /coins/{id}/market_chart
#[derive(Debug, Deserialize)]
pub(super) struct MarketChartResponse {
    /// `[timestamp_millis, price]` pairs, oldest first. Kept as raw JSON so
    /// one bad point does not reject the whole body.
    pub prices: Option<Vec<serde_json::Value>>,
    // Note: market_caps and total_volumes exist but are not used
}
