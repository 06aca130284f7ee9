//! A small keyed cache with per entry time to live and single flight computation.
//!
//! Upstream sounding and temperature providers are slow and rate sensitive, so every
//! network facing component owns one of these instead of a process wide cache:
//! repeated requests inside the expiry window are served from memory, and concurrent
//! requests for the same key coalesce into one computation with the late arrivals
//! blocking on the winner's result.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Condvar, Mutex, MutexGuard},
    time::{Duration, Instant},
};

/// A thread safe map from key to value with a time to live per entry.
#[derive(Debug, Default)]
pub struct TtlCache<K, V> {
    inner: Mutex<HashMap<K, Slot<V>>>,
    cond: Condvar,
}

#[derive(Debug)]
enum Slot<V> {
    /// Some thread is computing the value for this key right now.
    InFlight,
    Ready { value: V, expires_at: Instant },
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache.
    pub fn new() -> Self {
        TtlCache {
            inner: Mutex::new(HashMap::new()),
            cond: Condvar::new(),
        }
    }

    /// Return the cached value for `key`, or run `compute` to produce it.
    ///
    /// At most one computation per key is in flight at a time; other callers for the
    /// same key block until it finishes and then share its value. A failed
    /// computation is not cached: the error goes to the caller that ran the
    /// computation, and one of the waiters takes over the slot and tries again.
    pub fn get_or_try_insert_with<E, F>(
        &self,
        key: K,
        ttl: Duration,
        compute: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
    {
        let mut guard = self.lock();
        loop {
            let in_flight = match guard.get(&key) {
                Some(Slot::Ready { value, expires_at }) if *expires_at > Instant::now() => {
                    return Ok(value.clone());
                }
                Some(Slot::InFlight) => true,
                _ => false,
            };

            if in_flight {
                guard = self
                    .cond
                    .wait(guard)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            } else {
                // Expired or absent: claim the slot and go compute.
                guard.insert(key.clone(), Slot::InFlight);
                break;
            }
        }
        drop(guard);

        // Make sure a panicking computation releases the slot so waiters do not
        // block forever.
        let mut flight = FlightGuard {
            cache: self,
            key,
            armed: true,
        };

        let result = compute();

        flight.armed = false;
        let mut guard = self.lock();
        match &result {
            Ok(value) => {
                guard.insert(
                    flight.key.clone(),
                    Slot::Ready {
                        value: value.clone(),
                        expires_at: Instant::now() + ttl,
                    },
                );
            }
            Err(_) => {
                guard.remove(&flight.key);
            }
        }
        drop(guard);
        self.cond.notify_all();

        result
    }

    /// The number of entries currently stored, in flight markers included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

struct FlightGuard<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    cache: &'a TtlCache<K, V>,
    key: K,
    armed: bool,
}

impl<'a, K, V> Drop for FlightGuard<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn drop(&mut self) {
        if self.armed {
            let mut guard = self.cache.lock();
            guard.remove(&self.key);
            drop(guard);
            self.cache.cond.notify_all();
        }
    }
}
