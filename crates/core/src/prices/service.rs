//! Price service: the read side of the cache plus polling control.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use pricewatch_market_data::{AssetDescriptor, AssetRegistry, AssetSnapshot, PriceFetcher};

use super::cache::{CacheEntry, PriceCache};
use super::poller::{PollingConfig, PricePoller};
use super::supervisor::{PollingSupervisor, StartOutcome};
use crate::errors::Result;

/// Answer to "what is the price of this asset right now?".
///
/// Keeps an unknown asset apart from a known asset whose first fetch has not
/// completed yet, so callers can answer "not found" and "retry soon"
/// differently.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceLookup {
    /// Cached data, possibly stale; check [`CacheEntry::is_stale`].
    Ready(CacheEntry),
    /// The asset is tracked but has no successful fetch yet.
    Pending,
    /// The id is not in the registry.
    UnknownAsset,
}

/// Trait for price reads and polling control.
#[async_trait]
pub trait PriceServiceTrait: Send + Sync {
    /// Tracked assets in registry order.
    fn list_assets(&self) -> Vec<AssetDescriptor>;

    /// Latest cached snapshot, or `None` before the first successful fetch.
    /// Never blocks on network I/O.
    fn get_cached_data(&self, asset_id: &str) -> Option<Arc<AssetSnapshot>>;

    /// Resolve an id against the registry and the cache.
    fn lookup(&self, asset_id: &str) -> PriceLookup;

    /// Start background polling. Safe to call any number of times.
    fn start_polling(&self) -> StartOutcome;

    fn is_polling(&self) -> bool;

    /// Stop background polling and wait for the task to end.
    async fn shutdown(&self, grace: Duration);
}

/// Default [`PriceServiceTrait`] implementation.
pub struct PriceService {
    registry: AssetRegistry,
    cache: Arc<PriceCache>,
    supervisor: PollingSupervisor,
}

impl PriceService {
    pub fn new(
        registry: AssetRegistry,
        fetcher: Arc<dyn PriceFetcher>,
        config: PollingConfig,
    ) -> Result<Self> {
        config.validate()?;

        let cache = Arc::new(PriceCache::new());
        let poller = PricePoller::new(fetcher, cache.clone(), registry.clone(), config);

        Ok(Self {
            registry,
            cache,
            supervisor: PollingSupervisor::new(Arc::new(poller)),
        })
    }

    pub fn cache(&self) -> &Arc<PriceCache> {
        &self.cache
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }
}

#[async_trait]
impl PriceServiceTrait for PriceService {
    fn list_assets(&self) -> Vec<AssetDescriptor> {
        self.registry.as_slice().to_vec()
    }

    fn get_cached_data(&self, asset_id: &str) -> Option<Arc<AssetSnapshot>> {
        self.cache.get_snapshot(asset_id)
    }

    fn lookup(&self, asset_id: &str) -> PriceLookup {
        if !self.registry.contains(asset_id) {
            debug!("Lookup for unknown asset '{}'", asset_id);
            return PriceLookup::UnknownAsset;
        }

        match self.cache.get(asset_id) {
            Some(entry) => PriceLookup::Ready(entry),
            None => PriceLookup::Pending,
        }
    }

    fn start_polling(&self) -> StartOutcome {
        self.supervisor.start_polling()
    }

    fn is_polling(&self) -> bool {
        self.supervisor.is_active()
    }

    async fn shutdown(&self, grace: Duration) {
        self.supervisor.shutdown(grace).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricewatch_market_data::{
        AssetCategory, FetchOutcome, HistoryPoint, MarketDataError,
    };

    struct FixedFetcher;

    #[async_trait]
    impl PriceFetcher for FixedFetcher {
        fn id(&self) -> &'static str {
            "FIXED"
        }

        async fn fetch(
            &self,
            asset: &AssetDescriptor,
        ) -> std::result::Result<FetchOutcome, MarketDataError> {
            if asset.id == "ethereum" {
                return Err(MarketDataError::RateLimited {
                    provider: "FIXED".to_string(),
                });
            }
            Ok(FetchOutcome::Fetched(AssetSnapshot {
                current_price: 42.0,
                change_24h_percent: -3.5,
                history: vec![HistoryPoint::new(2, 41.0), HistoryPoint::new(1, 40.0)],
            }))
        }
    }

    fn service() -> PriceService {
        PriceService::new(
            AssetRegistry::tracked_assets(),
            Arc::new(FixedFetcher),
            PollingConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_before_first_fetch() {
        let service = service();
        assert_eq!(service.lookup("bitcoin"), PriceLookup::Pending);
        assert_eq!(service.lookup("dogecoin"), PriceLookup::UnknownAsset);
        assert!(service.get_cached_data("bitcoin").is_none());
    }

    #[test]
    fn test_lookup_after_put() {
        let service = service();
        let entry = service.cache().put(
            "bitcoin",
            AssetSnapshot {
                current_price: 1.0,
                change_24h_percent: 2.0,
                history: Vec::new(),
            },
        );
        assert_eq!(service.lookup("bitcoin"), PriceLookup::Ready(entry));
    }

    #[test]
    fn test_untracked_cache_entry_is_still_unknown() {
        let service = service();
        service.cache().put(
            "dogecoin",
            AssetSnapshot {
                current_price: 1.0,
                change_24h_percent: 0.0,
                history: Vec::new(),
            },
        );
        assert_eq!(service.lookup("dogecoin"), PriceLookup::UnknownAsset);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = PriceService::new(
            AssetRegistry::tracked_assets(),
            Arc::new(FixedFetcher),
            PollingConfig {
                cycle_interval: Duration::ZERO,
                ..PollingConfig::default()
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_list_assets_in_registry_order() {
        let ids: Vec<String> = service().list_assets().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["bitcoin", "ethereum", "gold"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_populates_cache() {
        let service = service();
        assert_eq!(service.start_polling(), StartOutcome::Started);
        assert_eq!(service.start_polling(), StartOutcome::AlreadyActive);
        assert!(service.is_polling());

        tokio::time::sleep(Duration::from_secs(6)).await;

        let snapshot = service.get_cached_data("bitcoin").unwrap();
        assert_eq!(snapshot.current_price, 42.0);
        assert_eq!(snapshot.change_24h_percent, -3.5);
        assert_eq!(
            snapshot.history,
            vec![HistoryPoint::new(2, 41.0), HistoryPoint::new(1, 40.0)]
        );
        // ethereum is rate limited, gold never attempted
        assert_eq!(service.lookup("ethereum"), PriceLookup::Pending);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(service.lookup("gold"), PriceLookup::Pending);

        service.shutdown(Duration::from_secs(1)).await;
    }

    #[test]
    fn test_category_metadata_survives() {
        let service = service();
        let gold = service.registry().get("gold").unwrap();
        assert_eq!(gold.category, AssetCategory::Commodity);
    }
}
