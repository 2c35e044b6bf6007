//! Per-entry expiry timers.
//!
//! Each cached address gets one timer task on a dedicated multi-thread
//! runtime. When it fires it removes the address from the store, but only if
//! the address still belongs to the entry the timer was armed for.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::runtime::{Builder, Runtime};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use addrcache_core::constants::EXPIRY_WORKER_THREAD_NAME;
use addrcache_core::error::{AddressCacheError, Result};
use addrcache_core::CacheAddress;

use crate::store::{AddressStore, Generation};

pub(crate) struct ExpiryManager {
    /// Worker pool; `None` once shut down
    runtime: Mutex<Option<Runtime>>,
    /// Pending timers by entry generation
    timers: Arc<DashMap<Generation, AbortHandle>>,
    ttl: Duration,
}

impl ExpiryManager {
    /// Starts a pool of `workers` threads firing timers after `ttl`.
    pub(crate) fn start(ttl: Duration, workers: usize) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .thread_name(EXPIRY_WORKER_THREAD_NAME)
            .enable_time()
            .build()
            .map_err(|e| {
                warn!(workers, error = %e, "Failed to start expiry workers");
                AddressCacheError::SchedulingFailure(format!("failed to start expiry workers: {e}"))
            })?;

        debug!(workers, ttl_ms = ttl.as_millis() as u64, "Expiry workers started");

        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            timers: Arc::new(DashMap::new()),
            ttl,
        })
    }

    /// Schedules removal of `address` from `store` once the ttl has elapsed.
    pub(crate) fn arm<A: CacheAddress>(
        &self,
        store: &Arc<AddressStore<A>>,
        address: A,
        generation: Generation,
    ) -> Result<()> {
        let guard = self.runtime.lock();
        let Some(runtime) = guard.as_ref() else {
            warn!(address = ?address, generation, "Expiry workers are shut down, timer not armed");
            return Err(AddressCacheError::SchedulingFailure(
                "expiry workers are shut down".into(),
            ));
        };

        let store = Arc::clone(store);
        let timers = Arc::clone(&self.timers);
        let ttl = self.ttl;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            if store.expire(&address, generation) {
                debug!(address = ?address, generation, "Address expired");
            }
            timers.remove(&generation);
        });

        self.timers.insert(generation, handle.abort_handle());
        // The task may have finished before its handle was recorded.
        if handle.is_finished() {
            self.timers.remove(&generation);
        }
        Ok(())
    }

    /// Cancels the timer of one entry. No-op if it already fired.
    pub(crate) fn disarm(&self, generation: Generation) {
        if let Some((_, handle)) = self.timers.remove(&generation) {
            handle.abort();
        }
    }

    /// Cancels every pending timer and shuts the worker pool down.
    ///
    /// Returns the number of timers cancelled. Idempotent.
    pub(crate) fn cancel_all(&self) -> usize {
        let runtime = self.runtime.lock().take();

        let mut cancelled = 0;
        self.timers.retain(|_, handle| {
            handle.abort();
            cancelled += 1;
            false
        });

        if let Some(runtime) = runtime {
            runtime.shutdown_background();
            info!(cancelled, "Expiry workers shut down");
        }
        cancelled
    }

    /// Timers armed and not yet fired or cancelled.
    pub(crate) fn pending(&self) -> usize {
        self.timers.len()
    }

    pub(crate) fn is_running(&self) -> bool {
        self.runtime.lock().is_some()
    }
}

impl Drop for ExpiryManager {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const TTL: Duration = Duration::from_millis(50);
    const PAST_TTL: Duration = Duration::from_millis(250);

    fn setup() -> (Arc<AddressStore<&'static str>>, ExpiryManager) {
        (Arc::new(AddressStore::new()), ExpiryManager::start(TTL, 2).unwrap())
    }

    #[test]
    fn test_timer_removes_entry() {
        let (store, expiry) = setup();
        let generation = store.insert("alpha").unwrap();
        expiry.arm(&store, "alpha", generation).unwrap();
        assert_eq!(expiry.pending(), 1);

        sleep(PAST_TTL);

        assert!(!store.contains(&"alpha"));
        assert_eq!(expiry.pending(), 0);
    }

    #[test]
    fn test_timer_tolerates_removed_entry() {
        let (store, expiry) = setup();
        let generation = store.insert("alpha").unwrap();
        expiry.arm(&store, "alpha", generation).unwrap();
        store.remove(&"alpha");

        sleep(PAST_TTL);

        assert!(store.is_empty());
        assert_eq!(expiry.pending(), 0);
    }

    #[test]
    fn test_stale_timer_spares_new_entry() {
        let (store, expiry) = setup();
        let stale = store.insert("alpha").unwrap();
        expiry.arm(&store, "alpha", stale).unwrap();
        store.remove(&"alpha");

        // Re-added without a timer of its own; only the stale one fires
        store.insert("alpha").unwrap();
        sleep(PAST_TTL);

        assert!(store.contains(&"alpha"));
    }

    #[test]
    fn test_disarm() {
        let (store, expiry) = setup();
        let generation = store.insert("alpha").unwrap();
        expiry.arm(&store, "alpha", generation).unwrap();
        expiry.disarm(generation);
        assert_eq!(expiry.pending(), 0);

        sleep(PAST_TTL);

        assert!(store.contains(&"alpha"));
        // Disarming again is harmless
        expiry.disarm(generation);
    }

    #[test]
    fn test_cancel_all() {
        let (store, expiry) = setup();
        for name in ["alpha", "beta", "gamma"] {
            let generation = store.insert(name).unwrap();
            expiry.arm(&store, name, generation).unwrap();
        }

        assert_eq!(expiry.cancel_all(), 3);
        assert!(!expiry.is_running());
        assert_eq!(expiry.cancel_all(), 0);

        sleep(PAST_TTL);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_arm_after_shutdown_fails() {
        let (store, expiry) = setup();
        expiry.cancel_all();

        let generation = store.insert("alpha").unwrap();
        let err = expiry.arm(&store, "alpha", generation).unwrap_err();
        assert!(matches!(err, AddressCacheError::SchedulingFailure(_)));
    }
}
