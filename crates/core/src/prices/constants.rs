//! Polling schedule constants.

use std::time::Duration;

/// Delay between process start and the first polling cycle.
pub const STARTUP_DELAY: Duration = Duration::from_secs(5);

/// Courtesy pause after each asset before calling the provider again.
pub const INTER_ASSET_DELAY: Duration = Duration::from_secs(4);

/// Pause between the end of a cycle and the start of the next one.
pub const CYCLE_INTERVAL: Duration = Duration::from_secs(60);

/// Pause after a cycle that hit the provider's rate limit. Always twice
/// [`CYCLE_INTERVAL`].
pub const BACKOFF_INTERVAL: Duration = Duration::from_secs(120);

/// How long shutdown waits for an in-flight cycle before aborting it.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);
