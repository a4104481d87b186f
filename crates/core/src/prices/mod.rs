//! Price snapshot module.
//!
//! - [`cache`] - In-memory snapshot cache keyed by asset id
//! - [`poller`] - The polling cycle and its schedule
//! - [`supervisor`] - Start-once guard and stop handle for the polling task
//! - [`service`] - Read API and polling control used by the server
//! - [`constants`] - Default timings
//!
//! # Architecture
//!
//! ```text
//! PollingSupervisor ──spawns──► PricePoller ──► PriceFetcher (market-data crate)
//!                                    │
//!                                    ▼
//!   PriceService::lookup ◄──── PriceCache
//! ```

pub mod cache;
pub mod constants;
pub mod poller;
pub mod service;
pub mod supervisor;

pub use cache::{CacheEntry, PriceCache};
pub use poller::{AssetFetchResult, AssetFetchStatus, CycleReport, PollingConfig, PricePoller};
pub use service::{PriceLookup, PriceService, PriceServiceTrait};
pub use supervisor::{PollingState, PollingSupervisor, StartOutcome};
