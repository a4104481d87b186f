use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use pricewatch_market_data::provider::coingecko::DEFAULT_BASE_URL;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub coingecko_url: String,
    pub coingecko_api_key: Option<String>,
    /// Cached data older than this is reported as stale (but still served).
    pub stale_after: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("PRICEWATCH_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid PRICEWATCH_LISTEN_ADDR")?;
        let cors_allow = std::env::var("PRICEWATCH_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("PRICEWATCH_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let coingecko_url =
            std::env::var("PRICEWATCH_COINGECKO_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let coingecko_api_key = std::env::var("PRICEWATCH_COINGECKO_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let stale_after_secs: u64 = std::env::var("PRICEWATCH_STALE_AFTER_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .unwrap_or(300);
        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            coingecko_url,
            coingecko_api_key,
            stale_after: Duration::from_secs(stale_after_secs),
        })
    }
}
