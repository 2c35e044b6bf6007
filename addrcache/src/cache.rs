//! The address cache.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use addrcache_core::error::{AddressCacheError, Result};
use addrcache_core::types::{CacheConfig, CacheStats, TimeUnit};
use addrcache_core::CacheAddress;

use crate::expiry::ExpiryManager;
use crate::gate::{WaitGate, Wake};
use crate::store::AddressStore;

/// Thread-safe cache of unique addresses, most recent first.
///
/// Every added address is removed automatically once the configured max age
/// has passed. [`peek`](Self::peek) and [`take`](Self::take) always see the
/// most recently added address that is still cached; `take` blocks while the
/// cache is empty.
///
/// Share it between threads with an [`Arc`]. Call [`clear`](Self::clear)
/// when done; dropping the cache has the same effect on its timers.
pub struct AddressCache<A: CacheAddress = IpAddr> {
    store: Arc<AddressStore<A>>,
    expiry: ExpiryManager,
    gate: WaitGate,
    config: CacheConfig,
    ttl: Duration,
}

impl<A: CacheAddress> AddressCache<A> {
    /// Creates a cache whose entries live at most `max_age` `unit`s.
    ///
    /// Fails with [`AddressCacheError::InvalidConfiguration`] if `max_age`
    /// is zero or too large.
    pub fn new(max_age: u64, unit: TimeUnit) -> Result<Self> {
        Self::with_config(CacheConfig::new(max_age, unit))
    }

    /// Creates a cache from a full configuration.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let ttl = config.ttl()?;
        let expiry = ExpiryManager::start(ttl, config.expiry_workers)?;

        info!(
            max_age = config.max_age,
            unit = %config.unit,
            expiry_workers = config.expiry_workers,
            "Address cache created"
        );

        Ok(Self {
            store: Arc::new(AddressStore::new()),
            expiry,
            gate: WaitGate::new(),
            config,
            ttl,
        })
    }

    /// Creates a cache configured from `ADDRCACHE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::with_config(CacheConfig::from_env()?)
    }

    /// Adds an address unless it is already cached.
    ///
    /// Returns `Ok(true)` if the address was inserted, `Ok(false)` if it was
    /// already present. Wakes every thread blocked in [`take`](Self::take).
    ///
    /// # Errors
    ///
    /// - [`AddressCacheError::Closed`] after [`clear`](Self::clear).
    /// - [`AddressCacheError::SchedulingFailure`] if the expiry timer could
    ///   not be armed. The address stays cached without a guaranteed expiry.
    #[instrument(level = "debug", skip(self))]
    pub fn add(&self, address: A) -> Result<bool> {
        if self.gate.is_closed() {
            return Err(AddressCacheError::Closed);
        }

        let Some(generation) = self.store.insert(address.clone()) else {
            debug!("Address already cached");
            return Ok(false);
        };
        self.gate.signal();

        if let Err(e) = self.expiry.arm(&self.store, address.clone(), generation) {
            if self.gate.is_closed() {
                // Lost a race with clear()
                self.store.expire(&address, generation);
                return Err(AddressCacheError::Closed);
            }
            warn!(error = %e, "Address cached without expiry");
            return Err(e);
        }

        debug!(generation, "Address added");
        Ok(true)
    }

    /// Removes an address. Returns true if it was cached.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&self, address: &A) -> bool {
        match self.store.remove(address) {
            Some(generation) => {
                self.expiry.disarm(generation);
                debug!(generation, "Address removed");
                true
            }
            None => false,
        }
    }

    /// Returns the most recently added address without removing it.
    pub fn peek(&self) -> Option<A> {
        self.store.peek_tail()
    }

    /// Removes and returns the most recently added address, waiting for one
    /// if the cache is empty.
    ///
    /// Returns `Ok(None)` only when the cache is cleared.
    ///
    /// # Errors
    ///
    /// [`AddressCacheError::InterruptedWait`] if [`interrupt`](Self::interrupt)
    /// is called while waiting. Nothing is consumed; `take` can be retried.
    pub fn take(&self) -> Result<Option<A>> {
        self.take_until(None)
    }

    /// Like [`take`](Self::take), but gives up after `timeout`.
    ///
    /// Returns `Ok(None)` if nothing arrived in time; no entry is consumed.
    pub fn take_timeout(&self, timeout: Duration) -> Result<Option<A>> {
        // An unrepresentable deadline waits forever
        self.take_until(Instant::now().checked_add(timeout))
    }

    fn take_until(&self, deadline: Option<Instant>) -> Result<Option<A>> {
        loop {
            let ticket = self.gate.ticket();
            if ticket.closed {
                return Ok(None);
            }

            if let Some((address, generation)) = self.store.pop_tail() {
                self.expiry.disarm(generation);
                debug!(address = ?address, generation, "Address taken");
                return Ok(Some(address));
            }

            match self.gate.wait(ticket, deadline) {
                Wake::Signalled => continue,
                Wake::Closed | Wake::TimedOut => return Ok(None),
                Wake::Interrupted => return Err(AddressCacheError::InterruptedWait),
            }
        }
    }

    /// Interrupts every thread currently blocked in `take`.
    ///
    /// Each returns [`AddressCacheError::InterruptedWait`]. Later calls to
    /// `take` are unaffected.
    pub fn interrupt(&self) {
        let interrupted = self.gate.interrupt();
        debug!(interrupted, "Interrupted waiting consumers");
    }

    /// Tears the cache down.
    ///
    /// Cancels all expiry timers, releases every blocked `take` with
    /// `Ok(None)`, and drops all cached addresses. Calling it again does
    /// nothing. The cache accepts no new addresses afterwards.
    pub fn clear(&self) {
        let was_open = self.gate.close();
        let cancelled = self.expiry.cancel_all();
        let cleared = self.store.clear();

        if was_open {
            info!(cleared, cancelled, "Address cache cleared");
        }
    }

    /// Returns true if the address is cached.
    pub fn contains(&self, address: &A) -> bool {
        self.store.contains(address)
    }

    /// Number of cached addresses.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Cached addresses, most recent first.
    pub fn snapshot(&self) -> Vec<A> {
        self.store.snapshot()
    }

    /// Returns true once [`clear`](Self::clear) has been called.
    pub fn is_closed(&self) -> bool {
        self.gate.is_closed()
    }

    /// Configured maximum age, in [`unit`](Self::unit)s.
    pub fn max_age(&self) -> u64 {
        self.config.max_age
    }

    /// Unit of [`max_age`](Self::max_age).
    pub fn unit(&self) -> TimeUnit {
        self.config.unit
    }

    /// Maximum age as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the configuration the cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            live_entries: self.store.len(),
            pending_expiries: self.expiry.pending(),
            waiting_consumers: self.gate.waiting(),
            closed: self.gate.is_closed(),
        }
    }
}

impl<A: CacheAddress> fmt::Debug for AddressCache<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressCache")
            .field("config", &self.config)
            .field("len", &self.store.len())
            .field("running", &self.expiry.is_running())
            .finish()
    }
}
