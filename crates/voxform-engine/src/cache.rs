//! Distance-field cache with single-flight computation
//!
//! Grid-backed fields are expensive to build (mesh load plus distance
//! transform, potentially seconds), so they are memoized by a
//! deterministic key. The cache guarantees single-flight semantics: when
//! several callers race on an absent key, exactly one runs the compute
//! and every caller observes its result. A long-running compute never
//! blocks lookups of other keys. Entries live for the process lifetime
//! unless explicitly invalidated.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use thiserror::Error;
use tracing::{debug, trace};
use voxform_core::field::{Aabb, FieldNode};

/// Errors surfaced by cache lookups
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// The compute for this key failed; the failure is shared by every
    /// caller that was single-flighted on it, but the key is not
    /// poisoned - the next call retries
    #[error("cache compute failed for key '{key}': {message}")]
    Compute { key: String, message: String },
}

/// Immutable cached pair: a grid-backed field and its bounds.
///
/// Written once per key and never mutated; replaced only by explicit
/// invalidation.
#[derive(Clone)]
pub struct CacheEntry {
    pub field: FieldNode,
    pub bounds: Aabb,
}

impl CacheEntry {
    pub fn new(field: FieldNode, bounds: Aabb) -> Self {
        Self { field, bounds }
    }
}

/// One in-progress compute; waiters block on the condvar
struct Flight {
    result: Mutex<Option<Result<Arc<CacheEntry>, String>>>,
    done: Condvar,
}

impl Flight {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn finish(&self, outcome: Result<Arc<CacheEntry>, String>) {
        *self.result.lock() = Some(outcome);
        self.done.notify_all();
    }

    fn wait(&self, key: &str) -> Result<Arc<CacheEntry>, CacheError> {
        let mut guard = self.result.lock();
        loop {
            if let Some(outcome) = guard.as_ref() {
                return match outcome {
                    Ok(entry) => Ok(entry.clone()),
                    Err(message) => Err(CacheError::Compute {
                        key: key.to_string(),
                        message: message.clone(),
                    }),
                };
            }
            self.done.wait(&mut guard);
        }
    }
}

enum Slot {
    InFlight(Arc<Flight>),
    Ready(Arc<CacheEntry>),
}

/// Key-to-entry store for memoized grid-backed fields.
///
/// Created once at process start and passed by reference into any code
/// path that needs memoized fields; there is no ambient global instance.
#[derive(Default)]
pub struct DistanceFieldCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl DistanceFieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a ready entry without computing
    pub fn get(&self, key: &str) -> Option<Arc<CacheEntry>> {
        match self.slots.lock().get(key) {
            Some(Slot::Ready(entry)) => Some(entry.clone()),
            _ => None,
        }
    }

    /// Store an entry directly, replacing whatever held the key
    pub fn insert(&self, key: &str, entry: CacheEntry) {
        self.slots
            .lock()
            .insert(key.to_string(), Slot::Ready(Arc::new(entry)));
    }

    /// Drop a key; returns whether anything was removed
    pub fn invalidate(&self, key: &str) -> bool {
        self.slots.lock().remove(key).is_some()
    }

    /// Number of ready entries
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch the entry for `key`, running `compute` at most once per
    /// absent key even under concurrent callers.
    ///
    /// The map lock is only held for bookkeeping; the compute itself runs
    /// unlocked so other keys stay available while it works.
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> Result<Arc<CacheEntry>, CacheError>
    where
        F: FnOnce() -> anyhow::Result<CacheEntry>,
    {
        let flight = {
            let mut slots = self.slots.lock();
            match slots.get(key) {
                Some(Slot::Ready(entry)) => {
                    trace!(key, "cache hit");
                    return Ok(entry.clone());
                }
                Some(Slot::InFlight(flight)) => {
                    let flight = flight.clone();
                    drop(slots);
                    trace!(key, "joining in-flight compute");
                    return flight.wait(key);
                }
                None => {
                    let flight = Arc::new(Flight::new());
                    slots.insert(key.to_string(), Slot::InFlight(flight.clone()));
                    flight
                }
            }
        };

        debug!(key, "cache miss, computing");
        let outcome = compute();

        let result = {
            let mut slots = self.slots.lock();
            match outcome {
                Ok(entry) => {
                    let entry = Arc::new(entry);
                    slots.insert(key.to_string(), Slot::Ready(entry.clone()));
                    Ok(entry)
                }
                Err(err) => {
                    // Remove the slot so a later call retries
                    slots.remove(key);
                    Err(CacheError::Compute {
                        key: key.to_string(),
                        message: format!("{err:#}"),
                    })
                }
            }
        };

        match &result {
            Ok(entry) => flight.finish(Ok(entry.clone())),
            Err(CacheError::Compute { message, .. }) => flight.finish(Err(message.clone())),
        }
        result
    }
}

// ============================================================================
// Tests
// ============================================================================
