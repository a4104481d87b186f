//! In-memory snapshot cache.
//!
//! Holds the last successful snapshot per asset. Entries are replaced
//! wholesale and never evicted; an asset that has never been fetched simply
//! has no entry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use pricewatch_market_data::AssetSnapshot;

/// A cached snapshot and the time it was stored.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
    snapshot: Arc<AssetSnapshot>,
    fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(snapshot: AssetSnapshot, fetched_at: DateTime<Utc>) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            fetched_at,
        }
    }

    pub fn snapshot(&self) -> &Arc<AssetSnapshot> {
        &self.snapshot
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn fetched_at_millis(&self) -> i64 {
        self.fetched_at.timestamp_millis()
    }

    /// Time since the entry was stored, zero if `now` is earlier.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.fetched_at).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn age(&self) -> Duration {
        self.age_at(Utc::now())
    }

    /// True once the entry is older than `max_age`. Stale entries are still served.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.age() > max_age
    }
}

/// Concurrent map from asset id to [`CacheEntry`].
///
/// Reads are synchronous and never wait on the poller. A writer replaces the
/// whole entry under the shard lock, so a reader sees either the previous
/// entry or the new one.
#[derive(Debug, Default)]
pub struct PriceCache {
    entries: DashMap<String, CacheEntry>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `snapshot` for `asset_id`, stamped now, replacing any previous entry.
    pub fn put(&self, asset_id: &str, snapshot: AssetSnapshot) -> CacheEntry {
        self.put_at(asset_id, snapshot, Utc::now())
    }

    /// Store `snapshot` with an explicit timestamp.
    pub fn put_at(
        &self,
        asset_id: &str,
        snapshot: AssetSnapshot,
        fetched_at: DateTime<Utc>,
    ) -> CacheEntry {
        let entry = CacheEntry::new(snapshot, fetched_at);
        self.entries.insert(asset_id.to_string(), entry.clone());
        entry
    }

    pub fn get(&self, asset_id: &str) -> Option<CacheEntry> {
        self.entries.get(asset_id).map(|entry| entry.value().clone())
    }

    pub fn get_snapshot(&self, asset_id: &str) -> Option<Arc<AssetSnapshot>> {
        self.entries
            .get(asset_id)
            .map(|entry| Arc::clone(entry.value().snapshot()))
    }

    pub fn contains(&self, asset_id: &str) -> bool {
        self.entries.contains_key(asset_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pricewatch_market_data::HistoryPoint;
    use std::thread;

    fn snapshot(price: f64) -> AssetSnapshot {
        AssetSnapshot {
            current_price: price,
            change_24h_percent: price,
            history: vec![HistoryPoint::new(1, price), HistoryPoint::new(2, price)],
        }
    }

    #[test]
    fn test_absent_before_first_put() {
        let cache = PriceCache::new();
        assert!(cache.get("bitcoin").is_none());
        assert!(cache.get_snapshot("bitcoin").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_overwrites() {
        let cache = PriceCache::new();
        cache.put("bitcoin", snapshot(1.0));
        cache.put("bitcoin", snapshot(2.0));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_snapshot("bitcoin").unwrap().current_price, 2.0);
    }

    #[test]
    fn test_put_stamps_fetch_time() {
        let cache = PriceCache::new();
        let before = Utc::now();
        let entry = cache.put("gold", snapshot(1.0));
        let after = Utc::now();

        assert!(entry.fetched_at() >= before && entry.fetched_at() <= after);
        assert_eq!(cache.get("gold").unwrap(), entry);
        assert_eq!(entry.fetched_at_millis(), entry.fetched_at().timestamp_millis());
    }

    #[test]
    fn test_keys_are_independent() {
        let cache = PriceCache::new();
        cache.put("bitcoin", snapshot(1.0));
        cache.put("ethereum", snapshot(2.0));

        assert_eq!(cache.get_snapshot("bitcoin").unwrap().current_price, 1.0);
        assert_eq!(cache.get_snapshot("ethereum").unwrap().current_price, 2.0);
        assert!(!cache.contains("gold"));
    }

    #[test]
    fn test_staleness() {
        let cache = PriceCache::new();
        let old = Utc::now() - chrono::Duration::minutes(10);
        let entry = cache.put_at("bitcoin", snapshot(1.0), old);

        assert!(entry.is_stale(Duration::from_secs(300)));
        assert!(!entry.is_stale(Duration::from_secs(3600)));
        // Stale entries are still returned
        assert!(cache.get("bitcoin").is_some());
    }

    #[test]
    fn test_age_never_negative() {
        let fetched = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let entry = CacheEntry::new(snapshot(1.0), fetched);
        let earlier = fetched - chrono::Duration::seconds(30);
        assert_eq!(entry.age_at(earlier), Duration::ZERO);
        assert_eq!(
            entry.age_at(fetched + chrono::Duration::seconds(30)),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_concurrent_reads_never_see_torn_entries() {
        let cache = Arc::new(PriceCache::new());
        cache.put("bitcoin", snapshot(0.0));

        let writer = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 1..2000 {
                    cache.put("bitcoin", snapshot(i as f64));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..2000 {
                        let snap = cache.get_snapshot("bitcoin").unwrap();
                        let price = snap.current_price;
                        assert_eq!(snap.change_24h_percent, price);
                        assert!(snap.history.iter().all(|p| p.value == price));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(cache.get_snapshot("bitcoin").unwrap().current_price, 1999.0);
    }
}
