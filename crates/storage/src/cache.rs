//! Reference-counted resource cache
//!
//! `RefCache` bounds how many resources (pages, data items, ...) are held in
//! memory at once and coordinates concurrent first access to the same key.
//!
//! ## Entry states
//!
//! ```text
//!   absent ──acquire──▶ in-flight ──load ok──▶ present(refs ≥ 1)
//!     ▲                    │                        │
//!     └────load failed─────┘                        │ release → refs == 0
//!     └───────────evict done─── in-flight ◀─────────┘
//! ```
//!
//! A key occupies one capacity slot from the moment its load starts until its
//! write-back finishes. There is no warm retention: the last `release` evicts.
//!
//! ## Locking
//!
//! One mutex guards the bookkeeping. The `load` and `evict` hooks run with the
//! mutex released, so a slow fetch of one key never stalls other keys. The
//! in-flight marker keeps at most one load or write-back running per key;
//! acquirers of an in-flight key sleep on a condition variable and re-check
//! the key from scratch once woken. A waiter never receives a value from a
//! load it did not start unless that load published it as a present entry.

use crate::config::CacheConfig;
use keystone_core::CacheError;
use parking_lot::{Condvar, Mutex};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Loader and write-back hooks supplied by the layer that owns a cache.
///
/// Both hooks are called without the cache's internal lock held and may
/// block on I/O.
pub trait CacheSource: Send + Sync {
    /// Resource type held by the cache
    type Value: Send + Sync;

    /// Error returned by [`load`](CacheSource::load)
    type Error;

    /// Fetch the resource for `key` from the backing source.
    fn load(&self, key: u64) -> Result<Self::Value, Self::Error>;

    /// Write back or release a resource leaving the cache.
    fn evict(&self, value: Arc<Self::Value>);
}

struct Entry<V> {
    value: Arc<V>,
    refs: usize,
}

struct CacheState<V> {
    /// Present entries
    entries: FxHashMap<u64, Entry<V>>,
    /// Keys with a load or write-back underway
    in_flight: FxHashSet<u64>,
    /// Slots taken by present and in-flight keys
    slots: usize,
}

/// Capacity-bounded, reference-counted cache.
///
/// # Example
///
/// ```
/// use keystone_storage::{CacheConfig, CacheSource, RefCache};
/// use std::sync::Arc;
///
/// struct Squares;
///
/// impl CacheSource for Squares {
///     type Value = u64;
///     type Error = std::convert::Infallible;
///
///     fn load(&self, key: u64) -> Result<u64, Self::Error> {
///         Ok(key * key)
///     }
///
///     fn evict(&self, _value: Arc<u64>) {}
/// }
///
/// let cache = RefCache::new(Squares, CacheConfig::bounded(2));
/// assert_eq!(*cache.acquire(3).unwrap(), 9);
/// cache.release(3).unwrap();
/// assert!(cache.is_empty());
/// ```
pub struct RefCache<S: CacheSource> {
    source: S,
    capacity: usize,
    state: Mutex<CacheState<S::Value>>,
    /// Signalled whenever an in-flight marker clears
    settled: Condvar,
}

impl<S: CacheSource> RefCache<S> {
    /// Create a cache over `source`.
    pub fn new(source: S, config: CacheConfig) -> Self {
        RefCache {
            source,
            capacity: config.max_resources,
            state: Mutex::new(CacheState {
                entries: FxHashMap::default(),
                in_flight: FxHashSet::default(),
                slots: 0,
            }),
            settled: Condvar::new(),
        }
    }

    /// Create a cache holding at most `max_resources` resources (0 = unbounded).
    pub fn with_capacity(source: S, max_resources: usize) -> Self {
        Self::new(source, CacheConfig::bounded(max_resources))
    }

    /// Acquire a shared handle to the resource for `key`.
    ///
    /// Blocks while another caller is loading or writing back the same key.
    /// A present key has its reference count bumped; an absent key is loaded
    /// through [`CacheSource::load`] if a slot is free.
    ///
    /// # Errors
    ///
    /// - [`CacheError::Full`] immediately if every slot is taken. Nothing is
    ///   evicted to make room.
    /// - [`CacheError::Load`] with the loader's error. The slot and the
    ///   in-flight marker are rolled back first.
    pub fn acquire(&self, key: u64) -> Result<Arc<S::Value>, CacheError<S::Error>> {
        let mut state = self.state.lock();
        while state.in_flight.contains(&key) {
            self.settled.wait(&mut state);
        }

        if let Some(entry) = state.entries.get_mut(&key) {
            entry.refs += 1;
            return Ok(Arc::clone(&entry.value));
        }

        if self.capacity > 0 && state.slots >= self.capacity {
            warn!(key, capacity = self.capacity, "cache full, rejecting acquire");
            return Err(CacheError::Full {
                capacity: self.capacity,
            });
        }

        state.slots += 1;
        state.in_flight.insert(key);
        drop(state);

        let slot = InFlightSlot::new(self, key);
        match self.source.load(key) {
            Ok(value) => {
                let value = Arc::new(value);
                slot.publish(Arc::clone(&value));
                debug!(key, "loaded resource");
                Ok(value)
            }
            Err(e) => {
                drop(slot);
                debug!(key, "resource load failed, slot rolled back");
                Err(CacheError::Load(e))
            }
        }
    }

    /// Release one reference to `key`.
    ///
    /// Dropping the last reference writes the resource back through
    /// [`CacheSource::evict`] and frees its slot before returning. The key
    /// stays in flight during the write-back, so a concurrent `acquire` of
    /// the same key waits and then loads a fresh copy.
    ///
    /// # Errors
    ///
    /// [`CacheError::NotHeld`] if `key` is not present.
    pub fn release(&self, key: u64) -> Result<(), CacheError<S::Error>> {
        let mut state = self.state.lock();
        let refs = match state.entries.get_mut(&key) {
            Some(entry) => {
                entry.refs -= 1;
                entry.refs
            }
            None => return Err(CacheError::NotHeld { key }),
        };
        if refs > 0 {
            return Ok(());
        }

        let entry = match state.entries.remove(&key) {
            Some(entry) => entry,
            None => return Err(CacheError::NotHeld { key }),
        };
        state.in_flight.insert(key);
        drop(state);

        let slot = InFlightSlot::new(self, key);
        self.source.evict(entry.value);
        drop(slot);
        debug!(key, "evicted resource");
        Ok(())
    }

    /// Evict every present resource, regardless of outstanding references.
    ///
    /// Intended for process termination. Acquisitions already loading are
    /// neither awaited nor cancelled: a load that finishes after `shutdown`
    /// registers its entry as usual. Holders of drained keys keep their
    /// handles, but a later `release` of those keys returns
    /// [`CacheError::NotHeld`].
    pub fn shutdown(&self) {
        let drained: Vec<(u64, Entry<S::Value>)> = {
            let mut state = self.state.lock();
            let drained: Vec<_> = state.entries.drain().collect();
            for (key, _) in &drained {
                state.in_flight.insert(*key);
            }
            drained
        };

        info!(resources = drained.len(), "shutting down cache");
        // Every drained key holds its guard before the first evict runs
        let pending: Vec<_> = drained
            .into_iter()
            .map(|(key, entry)| (InFlightSlot::new(self, key), key, entry))
            .collect();
        for (slot, key, entry) in pending {
            if entry.refs > 0 {
                debug!(key, refs = entry.refs, "evicting resource with live references");
            }
            self.source.evict(entry.value);
            drop(slot);
        }
    }

    /// Number of slots taken by present and in-flight resources.
    pub fn len(&self) -> usize {
        self.state.lock().slots
    }

    /// Whether no resource is present or in flight.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity (0 = unbounded).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: u64) -> bool {
        self.state.lock().entries.contains_key(&key)
    }

    /// Current reference count of `key`, if present.
    pub fn ref_count(&self, key: u64) -> Option<usize> {
        self.state.lock().entries.get(&key).map(|entry| entry.refs)
    }

    /// The hooks this cache was built over.
    pub fn source(&self) -> &S {
        &self.source
    }
}

/// A reserved slot whose key is marked in flight.
///
/// Dropping it frees the slot and clears the marker, including during
/// unwinding out of a panicking hook. `publish` instead turns the
/// reservation into a present entry.
struct InFlightSlot<'a, S: CacheSource> {
    cache: &'a RefCache<S>,
    key: u64,
    armed: bool,
}

impl<'a, S: CacheSource> InFlightSlot<'a, S> {
    fn new(cache: &'a RefCache<S>, key: u64) -> Self {
        InFlightSlot {
            cache,
            key,
            armed: true,
        }
    }

    fn publish(mut self, value: Arc<S::Value>) {
        let mut state = self.cache.state.lock();
        state.in_flight.remove(&self.key);
        state.entries.insert(self.key, Entry { value, refs: 1 });
        drop(state);
        self.armed = false;
        self.cache.settled.notify_all();
    }
}

impl<'a, S: CacheSource> Drop for InFlightSlot<'a, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.cache.state.lock();
        state.in_flight.remove(&self.key);
        state.slots -= 1;
        drop(state);
        self.cache.settled.notify_all();
    }
}
