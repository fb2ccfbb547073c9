//! Memoizing computation cache
//!
//! Maps a [`ComputationKey`] to the single outcome of computing it. The first
//! caller for a key runs the computation; callers that arrive while it is in
//! flight block on the same entry and receive the same outcome; later callers
//! get the stored outcome back without recomputing.
//!
//! # Design
//!
//! ```text
//! request(key) ──► DashMap shard lock ──► Arc<CacheEntry>  (lock released)
//!                                              │
//!                                              ▼
//!                           OnceCell::get_or_init(compute)
//!                           ├─ first caller: runs compute
//!                           └─ others: block until it completes
//! ```
//!
//! The map shard lock is held only long enough to fetch or insert the entry,
//! so a computation may itself request other keys (nested metrics). A
//! computation that requests its own key deadlocks; dependency chains must be
//! acyclic.
//!
//! Failures are stored like successes and never retried. There is no
//! eviction: a cache lives as long as the context that owns it.

mod key;

pub use key::ComputationKey;

use crate::error::Result;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lifecycle state of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Pending,
    Resolved,
    Failed,
}

struct CacheEntry<V> {
    outcome: OnceCell<Result<Arc<V>>>,
}

impl<V> CacheEntry<V> {
    fn new() -> Self {
        Self {
            outcome: OnceCell::new(),
        }
    }

    fn state(&self) -> EntryState {
        match self.outcome.get() {
            None => EntryState::Pending,
            Some(Ok(_)) => EntryState::Resolved,
            Some(Err(_)) => EntryState::Failed,
        }
    }
}

#[derive(Debug, Default)]
struct CacheCounters {
    computations: AtomicU64,
    hits: AtomicU64,
    joins: AtomicU64,
}

/// Snapshot of cache activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    /// Number of keys ever requested
    pub entries: usize,
    /// Computations actually executed
    pub computations: u64,
    /// Requests answered from a settled entry
    pub hits: u64,
    /// Requests that waited on an in-flight computation
    pub joins: u64,
}

/// Process-scoped memoization of computations producing `V`
pub struct ComputationCache<V> {
    entries: DashMap<ComputationKey, Arc<CacheEntry<V>>>,
    counters: CacheCounters,
}

impl<V> Default for ComputationCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ComputationCache<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            counters: CacheCounters::default(),
        }
    }

    /// Return the outcome for `key`, running `compute` only if no caller has yet
    ///
    /// # Example
    /// ```
    /// use blocktime::artifacts::Dependency;
    /// use blocktime::cache::{ComputationCache, ComputationKey};
    /// use std::sync::Arc;
    ///
    /// let cache: ComputationCache<f64> = ComputationCache::new();
    /// let key = ComputationKey::from_parts("answer", [(Dependency::Trace, None)]);
    ///
    /// let first = cache.request(key, || Ok(42.0)).unwrap();
    /// let second = cache.request(key, || unreachable!()).unwrap();
    /// assert!(Arc::ptr_eq(&first, &second));
    /// ```
    pub fn request<F>(&self, key: ComputationKey, compute: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Result<V>,
    {
        let entry = Arc::clone(
            &self
                .entries
                .entry(key)
                .or_insert_with(|| Arc::new(CacheEntry::new())),
        );

        if let Some(outcome) = entry.outcome.get() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Cache hit for {}", key);
            return outcome.clone();
        }

        let mut computed = false;
        let outcome = entry.outcome.get_or_init(|| {
            computed = true;
            self.counters.computations.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Computing {}", key);
            let outcome = compute().map(Arc::new);
            if let Err(e) = &outcome {
                tracing::debug!("Computation {} failed: {}", key, e);
            }
            outcome
        });

        if !computed {
            self.counters.joins.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Joined in-flight computation {}", key);
        }

        outcome.clone()
    }

    /// State of the entry for `key`, `None` if it was never requested
    pub fn state(&self, key: &ComputationKey) -> Option<EntryState> {
        self.entries.get(key).map(|entry| entry.state())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            computations: self.counters.computations.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            joins: self.counters.joins.load(Ordering::Relaxed),
        }
    }
}
