use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use pricewatch_core::{PollingConfig, PriceService, PriceServiceTrait};
use pricewatch_market_data::{AssetRegistry, CoinGeckoConfig, CoinGeckoProvider};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub price_service: Arc<dyn PriceServiceTrait>,
    /// Cached data older than this is reported as stale.
    pub stale_after: Duration,
}

pub fn init_tracing() {
    let log_format = std::env::var("PRICEWATCH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let registry = AssetRegistry::tracked_assets();
    tracing::info!("Tracking {} assets", registry.len());

    let provider = Arc::new(CoinGeckoProvider::with_config(CoinGeckoConfig {
        base_url: config.coingecko_url.clone(),
        api_key: config.coingecko_api_key.clone(),
        ..CoinGeckoConfig::default()
    })?);
    tracing::info!("Price provider base URL: {}", provider.config().base_url);

    let price_service = Arc::new(PriceService::new(
        registry,
        provider,
        PollingConfig::default(),
    )?);

    Ok(Arc::new(AppState {
        price_service,
        stale_after: config.stale_after,
    }))
}
