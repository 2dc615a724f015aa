//! Expiring result cache.
//!
//! [`CacheStore`] is the seam for cache backends. Every operation is
//! fallible with [`CacheError::Unavailable`]; the engine absorbs those
//! failures and falls back to computing. [`InMemoryCache`] is the
//! in-process default.
//!
//! Entries expire after their TTL. An expired entry is treated as absent and
//! removed on read. There is no size bound and no LRU eviction.

mod memory;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::fingerprint::Fingerprint;
use crate::outcome::SimulationOutcome;

pub use memory::InMemoryCache;

/// Cache backend failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The backend cannot serve the request.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// One stored result.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    /// Key of the entry.
    pub fingerprint: Fingerprint,
    /// Stored result.
    pub outcome: Arc<SimulationOutcome>,
    /// Insertion instant.
    pub created_at: Instant,
    /// Lifetime from `created_at`.
    pub ttl: Duration,
}

impl CacheEntry {
    /// Creates an entry stamped with the current instant.
    pub fn new(fingerprint: Fingerprint, outcome: Arc<SimulationOutcome>, ttl: Duration) -> Self {
        Self {
            fingerprint,
            outcome,
            created_at: Instant::now(),
            ttl,
        }
    }

    /// Whether the entry has outlived its TTL at `now`.
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.ttl
    }
}

/// Storage backend for simulation results.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the live entry for `fingerprint`, removing it if expired.
    async fn get(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<Arc<SimulationOutcome>>, CacheError>;

    /// Stores `entry` unless a live entry with the same fingerprint exists.
    ///
    /// Returns whether the entry was stored.
    async fn insert_if_absent(&self, entry: CacheEntry) -> Result<bool, CacheError>;

    /// Removes the entry for `fingerprint`, returning whether one existed.
    async fn remove(&self, fingerprint: &Fingerprint) -> Result<bool, CacheError>;

    /// Drops every expired entry, returning how many were dropped.
    async fn purge_expired(&self) -> Result<usize, CacheError>;

    /// Number of stored entries, live or not yet purged.
    async fn len(&self) -> Result<usize, CacheError>;
}

/// Snapshot of cache activity.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing live.
    pub misses: u64,
    /// Backend failures absorbed.
    pub errors: u64,
    /// Results stored.
    pub sets: u64,
    /// `hits / (hits + misses)`, 0 before any lookup.
    pub hit_rate: f64,
}

/// Lock-free counters behind [`CacheStats`].
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
    sets: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            hits,
            misses,
            errors: self.errors.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }
}
