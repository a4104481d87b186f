//! Static list of tracked assets.
//!
//! The registry is fixed at process start. Its order is the order in which
//! the polling scheduler visits assets each cycle.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::models::{AssetCategory, AssetDescriptor};

/// Errors raised while building a registry.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate asset id: {0}")]
    DuplicateId(String),

    #[error("Asset id must not be empty")]
    EmptyId,
}

/// Read-only, ordered list of [`AssetDescriptor`]s.
///
/// Cheap to clone; clones share the same underlying list.
#[derive(Clone, Debug)]
pub struct AssetRegistry {
    assets: Arc<[AssetDescriptor]>,
}

impl AssetRegistry {
    /// Build a registry, rejecting empty or duplicate ids.
    pub fn new(assets: Vec<AssetDescriptor>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::with_capacity(assets.len());
        for asset in &assets {
            if asset.id.is_empty() {
                return Err(RegistryError::EmptyId);
            }
            if !seen.insert(asset.id.as_str()) {
                return Err(RegistryError::DuplicateId(asset.id.clone()));
            }
        }

        Ok(Self {
            assets: assets.into(),
        })
    }

    /// The assets tracked by default: Bitcoin, Ethereum and Gold (via Tether Gold).
    pub fn tracked_assets() -> Self {
        Self {
            assets: vec![
                AssetDescriptor::coingecko(
                    "bitcoin",
                    "BTC",
                    "Bitcoin",
                    AssetCategory::Crypto,
                    "bitcoin",
                ),
                AssetDescriptor::coingecko(
                    "ethereum",
                    "ETH",
                    "Ethereum",
                    AssetCategory::Crypto,
                    "ethereum",
                ),
                AssetDescriptor::coingecko(
                    "gold",
                    "XAU",
                    "Gold",
                    AssetCategory::Commodity,
                    "tether-gold",
                ),
            ]
            .into(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&AssetDescriptor> {
        self.assets.iter().find(|asset| asset.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Assets in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &AssetDescriptor> {
        self.assets.iter()
    }

    pub fn as_slice(&self) -> &[AssetDescriptor] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::tracked_assets()
    }
}
