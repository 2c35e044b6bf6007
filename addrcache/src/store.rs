//! Insertion-ordered set of live addresses.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use addrcache_core::CacheAddress;

/// Insertion number of an entry. Higher is more recent.
pub(crate) type Generation = u64;

struct StoreInner<A> {
    /// Address → generation of its live entry
    by_address: HashMap<A, Generation>,
    /// Generation → address, ordered by recency
    by_generation: BTreeMap<Generation, A>,
    next_generation: Generation,
}

impl<A: CacheAddress> StoreInner<A> {
    fn unlink(&mut self, address: &A) -> Option<Generation> {
        let generation = self.by_address.remove(address)?;
        self.by_generation.remove(&generation);
        Some(generation)
    }
}

/// Unique, recency-ordered address store.
///
/// Every operation takes the lock once, so each is atomic on its own. The
/// store knows nothing about expiry or waiting consumers.
pub(crate) struct AddressStore<A> {
    inner: RwLock<StoreInner<A>>,
}

impl<A: CacheAddress> AddressStore<A> {
    pub(crate) fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                by_address: HashMap::new(),
                by_generation: BTreeMap::new(),
                next_generation: 0,
            }),
        }
    }

    /// Inserts `address` at the tail unless it is already present.
    ///
    /// Returns the generation of the new entry, or `None` for a duplicate.
    pub(crate) fn insert(&self, address: A) -> Option<Generation> {
        let mut inner = self.inner.write();
        if inner.by_address.contains_key(&address) {
            return None;
        }
        let generation = inner.next_generation;
        inner.next_generation += 1;
        inner.by_address.insert(address.clone(), generation);
        inner.by_generation.insert(generation, address);
        Some(generation)
    }

    /// Removes `address`, returning the generation it was stored under.
    pub(crate) fn remove(&self, address: &A) -> Option<Generation> {
        self.inner.write().unlink(address)
    }

    /// Removes `address` only if it is still the entry of `generation`.
    pub(crate) fn expire(&self, address: &A, generation: Generation) -> bool {
        let mut inner = self.inner.write();
        if inner.by_address.get(address) != Some(&generation) {
            return false;
        }
        inner.unlink(address).is_some()
    }

    /// Most recently inserted live address.
    pub(crate) fn peek_tail(&self) -> Option<A> {
        self.inner
            .read()
            .by_generation
            .last_key_value()
            .map(|(_, address)| address.clone())
    }

    /// Removes and returns the most recently inserted live address.
    pub(crate) fn pop_tail(&self) -> Option<(A, Generation)> {
        let mut inner = self.inner.write();
        let (generation, address) = inner.by_generation.pop_last()?;
        inner.by_address.remove(&address);
        Some((address, generation))
    }

    pub(crate) fn contains(&self, address: &A) -> bool {
        self.inner.read().by_address.contains_key(address)
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.read().by_address.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.read().by_address.is_empty()
    }

    /// Live addresses, most recent first.
    pub(crate) fn snapshot(&self) -> Vec<A> {
        self.inner
            .read()
            .by_generation
            .values()
            .rev()
            .cloned()
            .collect()
    }

    /// Removes every entry, returning how many there were.
    pub(crate) fn clear(&self) -> usize {
        let mut inner = self.inner.write();
        let cleared = inner.by_address.len();
        inner.by_address.clear();
        inner.by_generation.clear();
        cleared
    }
}
