use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One point of a price series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Unix timestamp in milliseconds
    #[serde(rename = "timestamp")]
    pub timestamp_millis: i64,
    pub value: f64,
}

impl HistoryPoint {
    pub fn new(timestamp_millis: i64, value: f64) -> Self {
        Self {
            timestamp_millis,
            value,
        }
    }

    /// The point's timestamp as a UTC datetime, if it is in range.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp_millis).single()
    }
}

/// Current price, 24h change and intraday history for one asset.
///
/// Snapshots are immutable: a refresh builds a new one and replaces the old
/// one wholesale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSnapshot {
    pub current_price: f64,
    /// 24 hour change, in percent
    #[serde(rename = "change24h")]
    pub change_24h_percent: f64,
    /// Chronological, in the order the provider returned it
    pub history: Vec<HistoryPoint>,
}
