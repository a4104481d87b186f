//! Background price polling.
//!
//! # Cycle
//!
//! ```text
//! Idle --(startup delay)--> Running(1) --(60s | 120s)--> Running(2) --> ...
//! ```
//!
//! One cycle visits every asset in registry order:
//!
//! 1. fetch the asset; store the snapshot on success
//! 2. on a rate limit, end the cycle immediately and back off
//! 3. on any other failure, log it and move on
//! 4. pause [`PollingConfig::inter_asset_delay`] before the next asset
//!
//! The loop stops only when the supervisor's stop signal fires. Stops are
//! observed during the startup and inter-cycle waits, never mid-cycle.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::watch;

use pricewatch_market_data::{
    AssetRegistry, FailureClass, FetchOutcome, MarketDataError, PriceFetcher,
};

use super::cache::PriceCache;
use super::constants::{CYCLE_INTERVAL, INTER_ASSET_DELAY, STARTUP_DELAY};
use crate::errors::{Error, Result};

// =============================================================================
// Configuration
// =============================================================================

/// Timing of the polling loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollingConfig {
    /// Wait before the very first cycle.
    pub startup_delay: Duration,
    /// Courtesy pause after each asset.
    pub inter_asset_delay: Duration,
    /// Wait between cycles when the provider did not rate limit us.
    pub cycle_interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            startup_delay: STARTUP_DELAY,
            inter_asset_delay: INTER_ASSET_DELAY,
            cycle_interval: CYCLE_INTERVAL,
        }
    }
}

impl PollingConfig {
    /// Wait after a rate-limited cycle: twice the normal interval.
    pub fn backoff_interval(&self) -> Duration {
        self.cycle_interval * 2
    }

    /// Delay before the next cycle given how this one ended.
    pub fn next_delay(&self, hit_rate_limit: bool) -> Duration {
        if hit_rate_limit {
            self.backoff_interval()
        } else {
            self.cycle_interval
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cycle_interval.is_zero() {
            return Err(Error::InvalidConfigValue(
                "cycle interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Cycle Result Types
// =============================================================================

/// What happened to one asset during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFetchStatus {
    /// Fresh snapshot stored in the cache.
    Updated,
    /// The provider does not price this asset; nothing was requested.
    Unsupported,
    /// The fetch failed; the previous cache entry, if any, is kept.
    Failed,
    /// The provider rate limited the fetch; the cycle ended here.
    RateLimited,
    /// Skipped because an earlier asset hit the rate limit.
    NotAttempted,
}

/// Result for a single asset within a cycle.
#[derive(Debug, Clone)]
pub struct AssetFetchResult {
    pub asset_id: String,
    pub status: AssetFetchStatus,
    /// Error message for failed or rate-limited fetches.
    pub error: Option<String>,
}

/// Summary of one polling cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub cycle: u64,
    /// One result per registry asset, in registry order.
    pub results: Vec<AssetFetchResult>,
    pub hit_rate_limit: bool,
    /// Delay before the next cycle starts.
    pub next_delay: Duration,
}

impl CycleReport {
    pub fn status_of(&self, asset_id: &str) -> Option<AssetFetchStatus> {
        self.results
            .iter()
            .find(|r| r.asset_id == asset_id)
            .map(|r| r.status)
    }

    pub fn count(&self, status: AssetFetchStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Ids with the given status, in registry order.
    pub fn ids_with(&self, status: AssetFetchStatus) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.status == status)
            .map(|r| r.asset_id.as_str())
            .collect()
    }

    /// Per-status counts for the cycle log line.
    pub fn summary(&self) -> String {
        format!(
            "{} updated, {} failed, {} rate limited, {} unsupported, {} not attempted",
            self.count(AssetFetchStatus::Updated),
            self.count(AssetFetchStatus::Failed),
            self.count(AssetFetchStatus::RateLimited),
            self.count(AssetFetchStatus::Unsupported),
            self.count(AssetFetchStatus::NotAttempted),
        )
    }
}

// =============================================================================
// PricePoller
// =============================================================================

/// Drives the fetcher over the registry and keeps the cache current.
pub struct PricePoller {
    fetcher: Arc<dyn PriceFetcher>,
    cache: Arc<PriceCache>,
    registry: AssetRegistry,
    config: PollingConfig,
}

impl PricePoller {
    pub fn new(
        fetcher: Arc<dyn PriceFetcher>,
        cache: Arc<PriceCache>,
        registry: AssetRegistry,
        config: PollingConfig,
    ) -> Self {
        Self {
            fetcher,
            cache,
            registry,
            config,
        }
    }

    pub fn config(&self) -> &PollingConfig {
        &self.config
    }

    /// Run one full pass over the registry.
    ///
    /// Never fails: every per-asset error is recorded in the report.
    pub async fn run_cycle(&self, cycle: u64) -> CycleReport {
        info!(
            "Starting price update cycle {} for {} assets via {}",
            cycle,
            self.registry.len(),
            self.fetcher.id()
        );

        let mut results = Vec::with_capacity(self.registry.len());
        let mut hit_rate_limit = false;

        for asset in self.registry.iter() {
            if hit_rate_limit {
                results.push(AssetFetchResult {
                    asset_id: asset.id.clone(),
                    status: AssetFetchStatus::NotAttempted,
                    error: None,
                });
                continue;
            }

            let result = match self.fetcher.fetch(asset).await {
                Ok(FetchOutcome::Fetched(snapshot)) => {
                    self.cache.put(&asset.id, snapshot);
                    info!("Updated cache for {}", asset.id);
                    AssetFetchResult {
                        asset_id: asset.id.clone(),
                        status: AssetFetchStatus::Updated,
                        error: None,
                    }
                }
                Ok(FetchOutcome::Unsupported) => {
                    debug!("Skipping {}: not supported by {}", asset.id, self.fetcher.id());
                    AssetFetchResult {
                        asset_id: asset.id.clone(),
                        status: AssetFetchStatus::Unsupported,
                        error: None,
                    }
                }
                Err(e) => self.handle_failure(&asset.id, e, &mut hit_rate_limit),
            };
            results.push(result);

            if !hit_rate_limit && !self.config.inter_asset_delay.is_zero() {
                tokio::time::sleep(self.config.inter_asset_delay).await;
            }
        }

        let report = CycleReport {
            cycle,
            results,
            hit_rate_limit,
            next_delay: self.config.next_delay(hit_rate_limit),
        };

        let skipped = report.ids_with(AssetFetchStatus::NotAttempted);
        if !skipped.is_empty() {
            warn!("Not attempted after rate limit: {}", skipped.join(", "));
        }
        info!(
            "Update cycle {} complete ({}). Next update in {}s.",
            cycle,
            report.summary(),
            report.next_delay.as_secs()
        );

        report
    }

    fn handle_failure(
        &self,
        asset_id: &str,
        err: MarketDataError,
        hit_rate_limit: &mut bool,
    ) -> AssetFetchResult {
        let status = match err.failure_class() {
            FailureClass::BackOff => {
                warn!("Rate limit hit for {}. Backing off...", asset_id);
                *hit_rate_limit = true;
                AssetFetchStatus::RateLimited
            }
            FailureClass::Continue => {
                error!("Failed to update {}: {}", asset_id, err);
                AssetFetchStatus::Failed
            }
        };

        AssetFetchResult {
            asset_id: asset_id.to_string(),
            status,
            error: Some(err.to_string()),
        }
    }

    /// Poll until `stop` turns true or its sender is dropped.
    pub async fn run(&self, mut stop: watch::Receiver<bool>) {
        info!(
            "Price polling scheduled, first update in {}s",
            self.config.startup_delay.as_secs()
        );
        if wait_or_stop(self.config.startup_delay, &mut stop).await {
            info!("Price polling stopped before the first cycle");
            return;
        }

        let mut cycle: u64 = 1;
        loop {
            let report = self.run_cycle(cycle).await;
            if wait_or_stop(report.next_delay, &mut stop).await {
                break;
            }
            cycle += 1;
        }

        info!("Price polling stopped after {} cycle(s)", cycle);
    }
}

/// Sleep for `delay`. Returns true if a stop was requested instead.
async fn wait_or_stop(delay: Duration, stop: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = stop_requested(stop) => true,
        _ = tokio::time::sleep(delay) => false,
    }
}

/// Resolves once the stop flag is set or the sender is gone.
async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    while !*stop.borrow_and_update() {
        if stop.changed().await.is_err() {
            return;
        }
    }
}
