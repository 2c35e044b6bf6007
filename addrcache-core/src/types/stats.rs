//! Cache statistics.

use serde::{Deserialize, Serialize};

/// Point-in-time statistics of an address cache.
///
/// Values are read without a global lock, so they may be momentarily
/// inconsistent with each other under concurrent use.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Addresses currently cached
    pub live_entries: usize,
    /// Expiry timers armed and not yet fired or cancelled
    pub pending_expiries: usize,
    /// Threads currently blocked in `take`
    pub waiting_consumers: usize,
    /// Whether the cache has been cleared
    pub closed: bool,
}
