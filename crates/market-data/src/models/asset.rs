use serde::{Deserialize, Serialize};

/// Asset classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Crypto,
    Commodity,
    Index,
}

/// Which upstream source an asset is priced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// CoinGecko public API
    CoinGecko,
    /// Placeholder for assets with no live source yet
    Mock,
}

/// A trackable asset and the metadata needed to price it.
///
/// Descriptors are built once from static configuration and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDescriptor {
    /// Unique identifier, used as the cache key
    pub id: String,
    /// Display ticker (BTC, XAU, ...)
    pub symbol: String,
    /// Human readable name
    pub name: String,
    #[serde(rename = "type")]
    pub category: AssetCategory,
    pub provider_kind: ProviderKind,
    /// Provider-specific reference, e.g. the CoinGecko coin id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_ref: Option<String>,
}

impl AssetDescriptor {
    /// Describe an asset priced through CoinGecko.
    pub fn coingecko(
        id: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        category: AssetCategory,
        coingecko_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
            category,
            provider_kind: ProviderKind::CoinGecko,
            provider_ref: Some(coingecko_id.into()),
        }
    }

    /// Provider reference for the given provider, if this asset is priced there.
    pub fn provider_ref_for(&self, kind: ProviderKind) -> Option<&str> {
        if self.provider_kind != kind {
            return None;
        }
        self.provider_ref.as_deref().filter(|r| !r.is_empty())
    }
}
