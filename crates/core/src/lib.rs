//! Pricewatch Core - background polling and the snapshot cache.
//!
//! This crate keeps an in-memory snapshot of prices for the tracked assets,
//! refreshed by a single background task, and answers reads from that
//! snapshot without touching the network.

pub mod errors;
pub mod prices;

// Re-export the types the server needs
pub use prices::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
