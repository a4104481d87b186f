//! CoinGecko price provider.
//!
//! Each fetch makes two calls for the asset:
//! - `/simple/price` for the current USD price and 24h change
//! - `/coins/{id}/market_chart` for the last day of prices
//!
//! The public API is heavily rate limited, so the two calls are separated by a
//! fixed pause. A 429 from either call surfaces as
//! [`MarketDataError::RateLimited`].
//!
//! API documentation: https://docs.coingecko.com/reference/introduction

mod models;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::errors::{MarketDataError, Result};
use crate::models::{AssetDescriptor, AssetSnapshot, HistoryPoint, ProviderKind};
use crate::provider::{FetchOutcome, PriceFetcher};

use models::{MarketChartResponse, SimplePriceResponse};

const PROVIDER_ID: &str = "COINGECKO";

/// Public API root
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Display currency for every request
const VS_CURRENCY: &str = "usd";

/// Days of history requested from market_chart
const HISTORY_DAYS: &str = "1";

/// Header carrying a demo-plan API key
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Pause between the price call and the history call for the same asset
pub const DEFAULT_INTER_CALL_DELAY: Duration = Duration::from_secs(2);

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "PriceTrackerDashboard/1.0";

/// Settings for [`CoinGeckoProvider`].
#[derive(Clone, Debug)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    pub inter_call_delay: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub api_key: Option<String>,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            inter_call_delay: DEFAULT_INTER_CALL_DELAY,
            request_timeout: REQUEST_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
            api_key: None,
        }
    }
}

/// CoinGecko price provider.
pub struct CoinGeckoProvider {
    client: Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoProvider {
    /// Create a provider against the public API with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(CoinGeckoConfig::default())
    }

    /// Fails if the HTTP client cannot be built from `config`.
    pub fn with_config(mut config: CoinGeckoConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = config.api_key.as_deref() {
            match HeaderValue::from_str(key) {
                Ok(value) => {
                    headers.insert(API_KEY_HEADER, value);
                }
                Err(_) => warn!("CoinGecko API key is not a valid header value, ignoring it"),
            }
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| MarketDataError::Transport {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CoinGeckoConfig {
        &self.config
    }

    /// Make a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        debug!("CoinGecko request: {}", endpoint);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| MarketDataError::Transport {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }
        if !status.is_success() {
            return Err(MarketDataError::HttpStatus {
                provider: PROVIDER_ID.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::Transport {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response: {}", e),
            })?;

        serde_json::from_str(&body).map_err(|e| malformed(format!("Invalid JSON: {}", e)))
    }

    /// Current price and 24h change.
    async fn fetch_price(&self, coin_id: &str) -> Result<(f64, f64)> {
        let response: SimplePriceResponse = self
            .get_json(
                "/simple/price",
                &[
                    ("ids", coin_id),
                    ("vs_currencies", VS_CURRENCY),
                    ("include_24hr_change", "true"),
                ],
            )
            .await?;

        parse_simple_price(response, coin_id)
    }

    /// Last day of prices.
    async fn fetch_history(&self, coin_id: &str) -> Result<Vec<HistoryPoint>> {
        let response: MarketChartResponse = self
            .get_json(
                &format!("/coins/{}/market_chart", coin_id),
                &[("vs_currency", VS_CURRENCY), ("days", HISTORY_DAYS)],
            )
            .await?;

        parse_market_chart(response)
    }
}

#[async_trait]
impl PriceFetcher for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch(&self, asset: &AssetDescriptor) -> Result<FetchOutcome> {
        let Some(coin_id) = asset.provider_ref_for(ProviderKind::CoinGecko) else {
            debug!("Asset {} is not priced by CoinGecko, skipping", asset.id);
            return Ok(FetchOutcome::Unsupported);
        };

        let (current_price, change_24h_percent) = self.fetch_price(coin_id).await?;

        if !self.config.inter_call_delay.is_zero() {
            tokio::time::sleep(self.config.inter_call_delay).await;
        }

        let history = self.fetch_history(coin_id).await?;

        Ok(FetchOutcome::Fetched(AssetSnapshot {
            current_price,
            change_24h_percent,
            history,
        }))
    }
}

fn malformed(message: impl Into<String>) -> MarketDataError {
    MarketDataError::MalformedPayload {
        provider: PROVIDER_ID.to_string(),
        message: message.into(),
    }
}

/// Pick the coin's price and change out of a /simple/price response.
///
/// A missing change is reported as 0.0; a missing coin or price is malformed.
fn parse_simple_price(mut response: SimplePriceResponse, coin_id: &str) -> Result<(f64, f64)> {
    let entry = response
        .remove(coin_id)
        .ok_or_else(|| malformed("Price data missing"))?;
    let price = entry.usd.ok_or_else(|| malformed("Missing usd price"))?;
    let change = entry.usd_24h_change.unwrap_or(0.0);
    Ok((price, change))
}

/// Convert market_chart prices into history points, keeping input order.
///
/// Points that are not a `[timestamp, value]` pair of numbers are dropped.
fn parse_market_chart(response: MarketChartResponse) -> Result<Vec<HistoryPoint>> {
    let prices = response
        .prices
        .ok_or_else(|| malformed("Missing history prices"))?;
    let total = prices.len();

    let history: Vec<HistoryPoint> = prices
        .into_iter()
        .filter_map(|point| parse_history_point(&point))
        .collect();

    if history.len() < total {
        debug!(
            "Dropped {} malformed history points",
            total - history.len()
        );
    }

    Ok(history)
}

fn parse_history_point(point: &serde_json::Value) -> Option<HistoryPoint> {
    match point.as_array()?.as_slice() {
        [ts, value, ..] => {
            let ts = ts.as_i64().or_else(|| ts.as_f64().map(|t| t as i64))?;
            Some(HistoryPoint::new(ts, value.as_f64()?))
        }
        _ => None,
    }
}
