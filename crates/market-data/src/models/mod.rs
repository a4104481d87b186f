//! Market data models
//!
//! - `asset` - Tracked asset descriptors (AssetDescriptor) and their classification
//! - `snapshot` - Price data for one asset (AssetSnapshot, HistoryPoint)

mod asset;
mod snapshot;

pub use asset::{AssetCategory, AssetDescriptor, ProviderKind};
pub use snapshot::{AssetSnapshot, HistoryPoint};
